pub mod course;
pub mod department;
pub mod enrollment;
pub mod ids;
pub mod professor;
pub mod schedule;
pub mod student;

pub use course::{Course, Credits};
pub use department::Department;
pub use enrollment::{Enrollment, EnrollmentStatus};
pub use ids::{CourseId, DepartmentId, EnrollmentId, ProfessorId, StudentId};
pub use professor::Professor;
pub use schedule::{DayOfWeek, Schedule};
pub use student::Student;
