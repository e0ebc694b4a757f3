use crate::domain::ids::SiteId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}
