use serde::{Deserialize, Serialize};

use super::ids::DepartmentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
}
