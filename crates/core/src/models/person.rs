//! People and roles

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UserId;
use crate::error::Error;
use crate::reconcile::Keyed;

/// Portal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// `alumno`
    #[serde(rename = "alumno")]
    Student,
    /// `docente`
    #[serde(rename = "docente")]
    Teacher,
    /// `coordinacion`
    #[serde(rename = "coordinacion")]
    Coordination,
}

impl Role {
    /// Tag used by the API and by client storage
    pub fn as_tag(&self) -> &'static str {
        match self {
            Role::Student => "alumno",
            Role::Teacher => "docente",
            Role::Coordination => "coordinacion",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Coordination => "Coordination",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "alumno" | "student" => Ok(Role::Student),
            "docente" | "teacher" => Ok(Role::Teacher),
            "coordinacion" | "coordinación" | "coordination" => Ok(Role::Coordination),
            other => Err(Error::InvalidOperation(format!("unknown role '{other}'"))),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Short description of another account, embedded in most resources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub career: Option<String>,
    pub phone: Option<String>,
    /// Raw role tag as reported by the server
    pub role: String,
}

/// A teacher that can be chosen as a proposal preference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub career: Option<String>,
    pub phone: Option<String>,
    /// Research branches; `None` when the server has no record
    pub branches: Option<Vec<String>>,
}

impl Teacher {
    /// Whether this teacher is listed for `branch`.
    ///
    /// A teacher with no recorded branches matches every branch.
    pub fn covers_branch(&self, branch: &str) -> bool {
        match &self.branches {
            None => true,
            Some(list) if list.is_empty() => true,
            Some(list) => list.iter().any(|b| b == branch),
        }
    }
}

impl Keyed for Teacher {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}

/// The signed-in identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<UserId>,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub rut: Option<String>,
    #[serde(default)]
    pub career: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl UserProfile {
    /// Id of the profile when it belongs to `role`
    pub fn id_as(&self, role: Role) -> Option<UserId> {
        if self.role == role {
            self.id
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn teacher(branches: Option<Vec<&str>>) -> Teacher {
        Teacher {
            id: UserId(7),
            name: "Ana".to_string(),
            email: "ana@utem.cl".to_string(),
            career: None,
            phone: None,
            branches: branches.map(|b| b.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_teachers_reconcile_by_id() {
        let mut list = vec![std::sync::Arc::new(teacher(None))];
        let mut renamed = teacher(Some(vec!["IA"]));
        renamed.name = "Ana María".to_string();

        let placement = crate::reconcile::upsert(&mut list, renamed);
        assert_eq!(placement, crate::reconcile::Placement::Replaced(0));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Ana María");
    }

    #[test]
    fn test_role_tags() {
        assert_eq!("alumno".parse::<Role>().unwrap(), Role::Student);
        assert_eq!(" Docente ".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("coordinacion".parse::<Role>().unwrap(), Role::Coordination);
        assert!("rector".parse::<Role>().is_err());
        assert_eq!(Role::Coordination.as_tag(), "coordinacion");
    }

    #[test]
    fn test_role_serde_uses_tags() {
        let json = serde_json::to_string(&Role::Student).unwrap();
        assert_eq!(json, "\"alumno\"");
    }

    #[test]
    fn test_teacher_without_branches_matches_everything() {
        assert!(teacher(None).covers_branch("Ciencia de Datos"));
        assert!(teacher(Some(vec![])).covers_branch("Ciencia de Datos"));
    }

    #[test]
    fn test_teacher_branch_filter() {
        let t = teacher(Some(vec!["Redes y Seguridad"]));
        assert!(t.covers_branch("Redes y Seguridad"));
        assert!(!t.covers_branch("Ciencia de Datos"));
    }

    #[test]
    fn test_profile_id_as_role() {
        let profile = UserProfile {
            id: Some(UserId(3)),
            role: Role::Student,
            name: "Luis".to_string(),
            email: "luis@utem.cl".to_string(),
            rut: None,
            career: None,
            phone: None,
        };
        assert_eq!(profile.id_as(Role::Student), Some(UserId(3)));
        assert_eq!(profile.id_as(Role::Teacher), None);
    }
}
