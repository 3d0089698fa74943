use crate::domain::error::ErrorResponse;
use crate::domain::error::ErrorResponse::StudentNotFoundError;
use crate::domain::page::{Page, PageRequest, PageResponse};
use crate::domain::server_timing::{timing::Timing, ServerTiming};
use crate::domain::student::{NewStudent, Student, StudentDto, StudentPayload};
use crate::image_service::{encode_photo, photo_from_text};
use crate::repository::StudentRepository;
use hyper::StatusCode;
use std::time::Instant;
use tracing::{debug, info, instrument};

const RETRIEVED_MANY: &str = "Students retrieved successfully";
const RETRIEVED_ONE: &str = "Student retrieved successfully";
const CREATED: &str = "Student created successfully";
const UPDATED: &str = "Student updated successfully";
const DELETED: &str = "Student deleted successfully";

/// A successful service outcome, ready to be wrapped in the response envelope.
#[derive(Debug)]
pub struct Reply<T> {
    pub status: StatusCode,
    pub message: &'static str,
    pub data: T,
    pub server_timing: ServerTiming,
}

impl<T> Reply<T> {
    fn ok(message: &'static str, data: T, server_timing: ServerTiming) -> Reply<T> {
        Reply {
            status: StatusCode::OK,
            message,
            data,
            server_timing,
        }
    }
}

pub type InternalResponse<T> = Result<Reply<T>, ErrorResponse>;

#[instrument(skip_all)]
pub async fn list_students(repository: &impl StudentRepository) -> InternalResponse<Vec<StudentDto>> {
    let mut server_timing = ServerTiming::default();
    debug!("Getting all students");

    let db_timer = Instant::now();
    let students = repository.find_all().await?;
    server_timing.push(Timing::since("db", db_timer));

    let data = to_dtos(students, &mut server_timing);
    Ok(Reply::ok(RETRIEVED_MANY, data, server_timing))
}

#[instrument(skip(repository))]
pub async fn list_students_paged(
    repository: &impl StudentRepository,
    request: PageRequest,
) -> InternalResponse<PageResponse<StudentDto>> {
    let mut server_timing = ServerTiming::default();

    let db_timer = Instant::now();
    let page = repository.find_page(request).await?;
    server_timing.push(Timing::since("db", db_timer));

    let data = to_page_response(page, &mut server_timing);
    Ok(Reply::ok(RETRIEVED_MANY, data, server_timing))
}

#[instrument(skip(repository))]
pub async fn search_students(
    repository: &impl StudentRepository,
    name: &str,
) -> InternalResponse<Vec<StudentDto>> {
    let mut server_timing = ServerTiming::default();

    let db_timer = Instant::now();
    let students = repository.find_by_name_containing(name).await?;
    server_timing.push(Timing::since("db", db_timer));

    let data = to_dtos(students, &mut server_timing);
    Ok(Reply::ok(RETRIEVED_MANY, data, server_timing))
}

#[instrument(skip(repository))]
pub async fn search_students_paged(
    repository: &impl StudentRepository,
    name: &str,
    request: PageRequest,
) -> InternalResponse<PageResponse<StudentDto>> {
    let mut server_timing = ServerTiming::default();

    let db_timer = Instant::now();
    let page = repository.find_by_name_containing_page(name, request).await?;
    server_timing.push(Timing::since("db", db_timer));

    let data = to_page_response(page, &mut server_timing);
    Ok(Reply::ok(RETRIEVED_MANY, data, server_timing))
}

#[instrument(skip(repository))]
pub async fn get_student(
    repository: &impl StudentRepository,
    id: u64,
) -> InternalResponse<StudentDto> {
    let mut server_timing = ServerTiming::default();

    let db_timer = Instant::now();
    let student = repository
        .find_by_id(id)
        .await?
        .ok_or(StudentNotFoundError { id })?;
    server_timing.push(Timing::since("db", db_timer));

    let data = to_dto_timed(student, &mut server_timing);
    Ok(Reply::ok(RETRIEVED_ONE, data, server_timing))
}

#[instrument(skip_all)]
pub async fn create_student(
    repository: &impl StudentRepository,
    payload: StudentPayload,
) -> InternalResponse<StudentDto> {
    let mut server_timing = ServerTiming::default();
    let valid = payload.validate()?;
    debug!("Saving new student: {}", valid.name);

    let dec_timer = Instant::now();
    let photo = photo_from_text(valid.photo_base64.as_deref());
    server_timing.push(Timing::since("dec", dec_timer));

    let db_timer = Instant::now();
    let student = repository
        .insert(NewStudent {
            name: valid.name,
            birth_date: valid.birth_date,
            mobile_no: valid.mobile_no,
            photo,
        })
        .await?;
    server_timing.push(Timing::since("db", db_timer));
    info!("Student saved successfully with ID: {}", student.id);

    let data = to_dto_timed(student, &mut server_timing);
    Ok(Reply {
        status: StatusCode::CREATED,
        ..Reply::ok(CREATED, data, server_timing)
    })
}

/// Overwrites the scalar fields. The photo is only replaced when new text is supplied.
#[instrument(skip(repository, payload))]
pub async fn update_student(
    repository: &impl StudentRepository,
    id: u64,
    payload: StudentPayload,
) -> InternalResponse<StudentDto> {
    let mut server_timing = ServerTiming::default();
    let valid = payload.validate()?;

    let db_timer = Instant::now();
    let mut student = repository
        .find_by_id(id)
        .await?
        .ok_or(StudentNotFoundError { id })?;
    server_timing.push(Timing::since("db", db_timer));

    student.name = valid.name;
    student.birth_date = valid.birth_date;
    student.mobile_no = valid.mobile_no;

    if let Some(text) = valid.photo_base64.as_deref().filter(|text| !text.is_empty()) {
        let dec_timer = Instant::now();
        student.photo = photo_from_text(Some(text));
        server_timing.push(Timing::since("dec", dec_timer));
    }

    let db_timer = Instant::now();
    let student = repository.update(student).await?;
    server_timing.push(Timing::since("db", db_timer));
    info!("Student updated successfully with ID: {}", student.id);

    let data = to_dto_timed(student, &mut server_timing);
    Ok(Reply::ok(UPDATED, data, server_timing))
}

#[instrument(skip(repository))]
pub async fn delete_student(repository: &impl StudentRepository, id: u64) -> InternalResponse<()> {
    let mut server_timing = ServerTiming::default();

    let db_timer = Instant::now();
    if !repository.delete_by_id(id).await? {
        return Err(StudentNotFoundError { id });
    }
    server_timing.push(Timing::since("db", db_timer));
    info!("Student deleted successfully with ID: {id}");

    Ok(Reply::ok(DELETED, (), server_timing))
}

/// Photo text is derived for this response only and never stored.
pub fn to_dto(student: Student) -> StudentDto {
    let photo_base64 = encode_photo(student.photo.as_deref());
    StudentDto {
        id: student.id,
        name: student.name,
        birth_date: student.birth_date,
        mobile_no: student.mobile_no,
        photo_base64,
    }
}

fn to_dto_timed(student: Student, server_timing: &mut ServerTiming) -> StudentDto {
    let enc_timer = Instant::now();
    let dto = to_dto(student);
    server_timing.push(Timing::since("enc", enc_timer));
    dto
}

fn to_dtos(students: Vec<Student>, server_timing: &mut ServerTiming) -> Vec<StudentDto> {
    let enc_timer = Instant::now();
    let dtos = students.into_iter().map(to_dto).collect();
    server_timing.push(Timing::since("enc", enc_timer));
    dtos
}

fn to_page_response(
    page: Page<Student>,
    server_timing: &mut ServerTiming,
) -> PageResponse<StudentDto> {
    let enc_timer = Instant::now();
    let response = PageResponse::from(page.map(to_dto));
    server_timing.push(Timing::since("enc", enc_timer));
    response
}
