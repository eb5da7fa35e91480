use serde::{Deserialize, Serialize};

use super::ids::{DepartmentId, ProfessorId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    pub id: ProfessorId,
    pub name: String,
    pub email: String,
    pub department_id: DepartmentId,
}
