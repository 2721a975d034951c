//! store::memory
//!
//! In-memory record store.
//!
//! # Design
//!
//! One mutex guards all tables, so every public method is atomic: callers
//! observe either none or all of a mutation. Reads clone records out;
//! nothing borrowed from the store outlives the call.
//!
//! Identifier generation is a monotonic counter per entity, starting at 1.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::core::graph::{CourseGraph, GraphError};
use crate::core::types::{CourseCode, CourseId, EmployeeNumber, EnrollmentId, InstructorId, StudentId};
use crate::model::{Course, Enrollment, Instructor, Student};

use super::{NewCourse, NewEnrollment, NewInstructor, NewStudent, StoreError};

/// The in-memory persistence collaborator.
///
/// # Example
///
/// ```
/// use registrar::core::types::CourseCode;
/// use registrar::store::{NewCourse, RecordStore};
///
/// let store = RecordStore::new();
/// let course = store
///     .insert_course(NewCourse {
///         name: "Algorithms".to_string(),
///         code: CourseCode::new("CS-301").unwrap(),
///         credits: 6,
///         instructor_id: None,
///     })
///     .unwrap();
///
/// assert_eq!(store.course(course.id).unwrap().name, "Algorithms");
/// ```
#[derive(Debug, Default)]
pub struct RecordStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    courses: HashMap<CourseId, Course>,
    instructors: HashMap<InstructorId, Instructor>,
    students: HashMap<StudentId, Student>,
    enrollments: HashMap<EnrollmentId, Enrollment>,
    /// Authoritative prerequisite edge index.
    graph: CourseGraph,
    next_course: u64,
    next_instructor: u64,
    next_student: u64,
    next_enrollment: u64,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // ---- courses ----------------------------------------------------------

    /// Insert a new course and assign its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the code is already taken.
    pub fn insert_course(&self, new: NewCourse) -> Result<Course, StoreError> {
        let mut inner = self.lock();

        if inner.courses.values().any(|c| c.code == new.code) {
            return Err(StoreError::Duplicate {
                field: "course code",
                value: new.code.to_string(),
            });
        }

        inner.next_course += 1;
        let id = CourseId::new(inner.next_course);
        let course = Course {
            id,
            name: new.name,
            code: new.code,
            credits: new.credits,
            instructor_id: new.instructor_id,
        };
        inner.courses.insert(id, course.clone());
        inner.graph.add_node(id);
        Ok(course)
    }

    /// Get a course by identifier.
    pub fn course(&self, id: CourseId) -> Result<Course, StoreError> {
        self.lock()
            .courses
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "course",
                id: id.value(),
            })
    }

    /// Find a course by its unique code.
    pub fn find_course_by_code(&self, code: &CourseCode) -> Option<Course> {
        self.lock()
            .courses
            .values()
            .find(|c| &c.code == code)
            .cloned()
    }

    /// List all courses, ordered by identifier.
    pub fn list_courses(&self) -> Vec<Course> {
        let inner = self.lock();
        let mut courses: Vec<Course> = inner.courses.values().cloned().collect();
        courses.sort_by_key(|c| c.id);
        courses
    }

    /// Whether a course exists.
    pub fn course_exists(&self, id: CourseId) -> bool {
        self.lock().courses.contains_key(&id)
    }

    /// Replace an existing course record.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the identifier is unknown
    /// - `StoreError::Duplicate` if the new code collides with another course
    pub fn replace_course(&self, course: Course) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if !inner.courses.contains_key(&course.id) {
            return Err(StoreError::NotFound {
                entity: "course",
                id: course.id.value(),
            });
        }
        if inner
            .courses
            .values()
            .any(|c| c.id != course.id && c.code == course.code)
        {
            return Err(StoreError::Duplicate {
                field: "course code",
                value: course.code.to_string(),
            });
        }

        inner.courses.insert(course.id, course);
        Ok(())
    }

    /// Delete a course record and its graph node.
    ///
    /// The caller is responsible for rejecting deletion while edges or
    /// enrollments still reference the course; this method removes the node
    /// unconditionally.
    pub fn delete_course(&self, id: CourseId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.courses.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "course",
                id: id.value(),
            });
        }
        inner.graph.remove_node(id);
        Ok(())
    }

    // ---- prerequisite graph -----------------------------------------------

    /// A consistent snapshot of the prerequisite graph at call time.
    pub fn graph_snapshot(&self) -> CourseGraph {
        self.lock().graph.clone()
    }

    /// Persist the edge "`course` requires `prerequisite`".
    ///
    /// Returns `Ok(true)` if the edge was inserted and `Ok(false)` if it was
    /// already present (idempotent no-op). Acyclicity is re-verified under
    /// the store lock immediately before the insert; a snapshot check done
    /// by the caller may be stale by the time this runs.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if either course is unknown
    /// - `StoreError::PrerequisiteCycle` if the edge would close a cycle
    ///   (nothing is persisted)
    pub fn add_prerequisite(
        &self,
        course: CourseId,
        prerequisite: CourseId,
    ) -> Result<bool, StoreError> {
        let mut inner = self.lock();

        if inner.graph.has_edge(course, prerequisite) {
            return Ok(false);
        }
        match inner.graph.would_cycle(course, prerequisite) {
            Ok(false) => {}
            Ok(true) => {
                return Err(StoreError::PrerequisiteCycle {
                    course,
                    prerequisite,
                })
            }
            Err(e) => return Err(graph_not_found(e)),
        }

        inner
            .graph
            .add_edge(course, prerequisite)
            .map_err(graph_not_found)
    }

    /// Direct prerequisites of a course.
    pub fn prerequisites(&self, id: CourseId) -> Result<Vec<CourseId>, StoreError> {
        let inner = self.lock();
        if !inner.graph.contains(id) {
            return Err(StoreError::NotFound {
                entity: "course",
                id: id.value(),
            });
        }
        Ok(inner.graph.prerequisites(id))
    }

    /// Courses that directly require `id`.
    pub fn dependents(&self, id: CourseId) -> Result<Vec<CourseId>, StoreError> {
        let inner = self.lock();
        if !inner.graph.contains(id) {
            return Err(StoreError::NotFound {
                entity: "course",
                id: id.value(),
            });
        }
        Ok(inner.graph.dependents(id))
    }

    /// Whether any prerequisite edge, in either direction, touches `id`.
    pub fn course_has_edges(&self, id: CourseId) -> bool {
        self.lock().graph.has_any_edges(id)
    }

    // ---- instructors ------------------------------------------------------

    /// Insert a new instructor and assign their identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if the email or employee number is
    /// already taken.
    pub fn insert_instructor(&self, new: NewInstructor) -> Result<Instructor, StoreError> {
        let mut inner = self.lock();

        if inner.instructors.values().any(|i| i.email == new.email) {
            return Err(StoreError::Duplicate {
                field: "email",
                value: new.email.to_string(),
            });
        }
        if inner
            .instructors
            .values()
            .any(|i| i.employee_number == new.employee_number)
        {
            return Err(StoreError::Duplicate {
                field: "employee number",
                value: new.employee_number.to_string(),
            });
        }

        inner.next_instructor += 1;
        let id = InstructorId::new(inner.next_instructor);
        let instructor = Instructor {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            birth_date: new.birth_date,
            employee_number: new.employee_number,
            department: new.department,
            status: new.status,
            created_by: new.created_by,
            created_at: new.created_at,
            modified_by: None,
            modified_at: None,
            deactivated_by: None,
            deactivated_at: None,
            deactivation_reason: None,
        };
        inner.instructors.insert(id, instructor.clone());
        Ok(instructor)
    }

    /// Get an instructor by identifier.
    pub fn instructor(&self, id: InstructorId) -> Result<Instructor, StoreError> {
        self.lock()
            .instructors
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "instructor",
                id: id.value(),
            })
    }

    /// Find an instructor by their unique employee number.
    pub fn find_instructor_by_employee_number(
        &self,
        number: &EmployeeNumber,
    ) -> Option<Instructor> {
        self.lock()
            .instructors
            .values()
            .find(|i| &i.employee_number == number)
            .cloned()
    }

    /// List all instructors, ordered by identifier.
    pub fn list_instructors(&self) -> Vec<Instructor> {
        let inner = self.lock();
        let mut instructors: Vec<Instructor> = inner.instructors.values().cloned().collect();
        instructors.sort_by_key(|i| i.id);
        instructors
    }

    /// Whether an instructor exists.
    pub fn instructor_exists(&self, id: InstructorId) -> bool {
        self.lock().instructors.contains_key(&id)
    }

    /// Replace an existing instructor record in one step.
    ///
    /// All field changes land atomically; a concurrent reader sees either
    /// the previous record or the replacement, never a mixture.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the identifier is unknown
    /// - `StoreError::Duplicate` if the email or employee number collides
    ///   with another instructor
    pub fn replace_instructor(&self, instructor: Instructor) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if !inner.instructors.contains_key(&instructor.id) {
            return Err(StoreError::NotFound {
                entity: "instructor",
                id: instructor.id.value(),
            });
        }
        if inner
            .instructors
            .values()
            .any(|i| i.id != instructor.id && i.email == instructor.email)
        {
            return Err(StoreError::Duplicate {
                field: "email",
                value: instructor.email.to_string(),
            });
        }
        if inner
            .instructors
            .values()
            .any(|i| i.id != instructor.id && i.employee_number == instructor.employee_number)
        {
            return Err(StoreError::Duplicate {
                field: "employee number",
                value: instructor.employee_number.to_string(),
            });
        }

        inner.instructors.insert(instructor.id, instructor);
        Ok(())
    }

    // ---- students ---------------------------------------------------------

    /// Insert a new student and assign their identifier.
    pub fn insert_student(&self, new: NewStudent) -> Student {
        let mut inner = self.lock();
        inner.next_student += 1;
        let id = StudentId::new(inner.next_student);
        let student = Student {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
        };
        inner.students.insert(id, student.clone());
        student
    }

    /// Whether a student exists.
    pub fn student_exists(&self, id: StudentId) -> bool {
        self.lock().students.contains_key(&id)
    }

    // ---- enrollments ------------------------------------------------------

    /// Insert a new enrollment and assign its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Duplicate` if an enrollment for the same
    /// (student, course) pair already exists.
    pub fn insert_enrollment(&self, new: NewEnrollment) -> Result<Enrollment, StoreError> {
        let mut inner = self.lock();

        if inner
            .enrollments
            .values()
            .any(|e| e.student_id == new.student_id && e.course_id == new.course_id)
        {
            return Err(StoreError::Duplicate {
                field: "enrollment",
                value: format!("student {} / course {}", new.student_id, new.course_id),
            });
        }

        inner.next_enrollment += 1;
        let id = EnrollmentId::new(inner.next_enrollment);
        let enrollment = Enrollment {
            id,
            student_id: new.student_id,
            course_id: new.course_id,
            enrolled_on: new.enrolled_on,
        };
        inner.enrollments.insert(id, enrollment.clone());
        Ok(enrollment)
    }

    /// Get an enrollment by identifier.
    pub fn enrollment(&self, id: EnrollmentId) -> Result<Enrollment, StoreError> {
        self.lock()
            .enrollments
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "enrollment",
                id: id.value(),
            })
    }

    /// List all enrollments, ordered by identifier.
    pub fn list_enrollments(&self) -> Vec<Enrollment> {
        let inner = self.lock();
        let mut enrollments: Vec<Enrollment> = inner.enrollments.values().cloned().collect();
        enrollments.sort_by_key(|e| e.id);
        enrollments
    }

    /// All enrollments of one student, ordered by identifier.
    pub fn enrollments_for_student(&self, student_id: StudentId) -> Vec<Enrollment> {
        let inner = self.lock();
        let mut enrollments: Vec<Enrollment> = inner
            .enrollments
            .values()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect();
        enrollments.sort_by_key(|e| e.id);
        enrollments
    }

    /// The enrollment for a (student, course) pair, if one exists.
    pub fn enrollment_for_pair(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Option<Enrollment> {
        self.lock()
            .enrollments
            .values()
            .find(|e| e.student_id == student_id && e.course_id == course_id)
            .cloned()
    }

    /// Whether any enrollment references the course.
    pub fn course_has_enrollments(&self, course_id: CourseId) -> bool {
        self.lock()
            .enrollments
            .values()
            .any(|e| e.course_id == course_id)
    }

    /// Delete an enrollment, freeing its (student, course) pair.
    pub fn delete_enrollment(&self, id: EnrollmentId) -> Result<(), StoreError> {
        let mut inner = self.lock();
        if inner.enrollments.remove(&id).is_none() {
            return Err(StoreError::NotFound {
                entity: "enrollment",
                id: id.value(),
            });
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // Mutations never panic between steps (plain map inserts), so a
        // poisoned lock still guards consistent tables; recover it.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn graph_not_found(error: GraphError) -> StoreError {
    match error {
        GraphError::UnknownCourse(id) => StoreError::NotFound {
            entity: "course",
            id: id.value(),
        },
    }
}
