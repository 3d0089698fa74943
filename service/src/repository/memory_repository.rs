use crate::domain::error::ErrorResponse;
use crate::domain::error::ErrorResponse::StudentNotFoundError;
use crate::domain::page::{Page, PageRequest};
use crate::domain::student::{NewStudent, Student};
use crate::repository::StudentRepository;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, Student>,
    last_id: u64,
}

impl Table {
    fn matching(&self, name: &str) -> Vec<Student> {
        let needle = name.to_lowercase();
        self.rows
            .values()
            .filter(|student| student.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

/// Keeps every student in process memory behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStudentRepository {
    table: RwLock<Table>,
}

impl MemoryStudentRepository {
    pub fn new() -> MemoryStudentRepository {
        MemoryStudentRepository::default()
    }
}

impl StudentRepository for MemoryStudentRepository {
    async fn find_all(&self) -> Result<Vec<Student>, ErrorResponse> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn find_page(&self, request: PageRequest) -> Result<Page<Student>, ErrorResponse> {
        let rows: Vec<Student> = self.table.read().await.rows.values().cloned().collect();
        Ok(Page::slice(rows, request))
    }

    async fn find_by_name_containing(&self, name: &str) -> Result<Vec<Student>, ErrorResponse> {
        Ok(self.table.read().await.matching(name))
    }

    async fn find_by_name_containing_page(
        &self,
        name: &str,
        request: PageRequest,
    ) -> Result<Page<Student>, ErrorResponse> {
        let rows = self.table.read().await.matching(name);
        Ok(Page::slice(rows, request))
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Student>, ErrorResponse> {
        let student = self.table.read().await.rows.get(&id).cloned();
        match student {
            Some(_) => debug!("Student hit: {id}"),
            None => debug!("Student miss: {id}"),
        }
        Ok(student)
    }

    #[instrument(skip_all)]
    async fn insert(&self, student: NewStudent) -> Result<Student, ErrorResponse> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let student = student.with_id(table.last_id);
        table.rows.insert(student.id, student.clone());
        info!("Student write: {}", student.id);
        Ok(student)
    }

    #[instrument(skip_all, fields(id = student.id))]
    async fn update(&self, student: Student) -> Result<Student, ErrorResponse> {
        let mut table = self.table.write().await;
        let row = table
            .rows
            .get_mut(&student.id)
            .ok_or(StudentNotFoundError { id: student.id })?;
        *row = student.clone();
        info!("Student write: {}", student.id);
        Ok(student)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: u64) -> Result<bool, ErrorResponse> {
        let removed = self.table.write().await.rows.remove(&id).is_some();
        if removed {
            info!("Student removed: {id}");
        }
        Ok(removed)
    }
}
