//! models/auth_model.rs
//! Roles de usuario y claims del JWT.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Usuario,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Usuario => "usuario",
        }
    }
}

/// Claims emitidos por el login del sistema administrativo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub login: String,
    pub nome: Option<String>,
    pub tipo: Role,
    /// Equipe a la que está vinculado un usuario no admin
    pub id_equipe: Option<String>,
    pub exp: usize,
}

/// Usuario autenticado en la request actual.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub login: String,
    pub name: Option<String>,
    pub role: Role,
    pub team_id: Option<String>,
}

impl AuthUser {
    /// Nombre para el registro de auditoría
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

impl From<Claims> for AuthUser {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            login: c.login,
            name: c.nome,
            role: c.tipo,
            team_id: c.id_equipe,
        }
    }
}

/// Permisos de un rol
#[derive(Debug, Clone, Serialize)]
pub struct AccessInfo {
    pub allowed_pages: &'static [&'static str],
    pub allowed_apis: &'static [&'static str],
    pub description: &'static str,
}
