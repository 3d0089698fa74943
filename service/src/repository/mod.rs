use crate::domain::error::ErrorResponse;
use crate::domain::page::{Page, PageRequest};
use crate::domain::student::{NewStudent, Student};
use std::future::Future;

pub(crate) mod memory_repository;

/// Storage for students. Rows are returned ordered by id.
pub trait StudentRepository: Send + Sync {
    fn find_all(&self) -> impl Future<Output = Result<Vec<Student>, ErrorResponse>> + Send;

    fn find_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Student>, ErrorResponse>> + Send;

    /// Case-insensitive substring match on the name.
    fn find_by_name_containing(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Vec<Student>, ErrorResponse>> + Send;

    fn find_by_name_containing_page(
        &self,
        name: &str,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<Student>, ErrorResponse>> + Send;

    fn find_by_id(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<Student>, ErrorResponse>> + Send;

    /// Store a new row under a freshly assigned id.
    fn insert(
        &self,
        student: NewStudent,
    ) -> impl Future<Output = Result<Student, ErrorResponse>> + Send;

    /// Replace an existing row, failing if it has gone away.
    fn update(
        &self,
        student: Student,
    ) -> impl Future<Output = Result<Student, ErrorResponse>> + Send;

    /// Remove a row and its photo. `false` when there was nothing to remove.
    fn delete_by_id(&self, id: u64) -> impl Future<Output = Result<bool, ErrorResponse>> + Send;
}
