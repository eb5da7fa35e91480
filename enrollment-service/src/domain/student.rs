use serde::{Deserialize, Serialize};

use super::ids::{DepartmentId, StudentId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub department_id: DepartmentId,
}
