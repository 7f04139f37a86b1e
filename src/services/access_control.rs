//! services/access_control.rs
//! Control de acceso por rol (admin / usuario) y validación del JWT.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use crate::models::{
    athlete_model::Athlete,
    auth_model::{AccessInfo, AuthUser, Claims, Role},
};

const ADMIN_ACCESS: AccessInfo = AccessInfo {
    allowed_pages: &[
        "dashboard",
        "atletas",
        "equipes",
        "competicoes",
        "resultados",
        "financeiro",
    ],
    allowed_apis: &["*"],
    description: "Administrador - Acceso total al sistema",
};

const USUARIO_ACCESS: AccessInfo = AccessInfo {
    allowed_pages: &[
        "dashboard",
        "atletas",
        "competicoes",
        "resultados",
        "financeiro",
    ],
    allowed_apis: &[
        "dashboard",
        "atletas",
        "competicoes",
        "resultados",
        "financeiro",
        "documentos",
        "carteirinhas",
        "exportacao",
    ],
    description: "Usuario - Acceso limitado a la propia equipe",
};

#[derive(Debug, Error, PartialEq)]
pub enum AccessDenied {
    #[error("Token no proporcionado")]
    MissingToken,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acceso denegado: usuarios del tipo \"{role}\" no pueden acceder a la API \"{api}\"")]
    Api { role: &'static str, api: String },

    #[error("Solo administradores pueden {0}")]
    AdminOnly(String),

    #[error("Usuario no está vinculado a una equipe")]
    NoTeam,

    #[error("Solo puede acceder a atletas de su propia equipe")]
    OtherTeam,
}

pub fn access_info(role: Role) -> &'static AccessInfo {
    match role {
        Role::Admin => &ADMIN_ACCESS,
        Role::Usuario => &USUARIO_ACCESS,
    }
}

pub fn can_access_page(role: Role, page: &str) -> bool {
    access_info(role).allowed_pages.contains(&page)
}

pub fn can_access_api(role: Role, api: &str) -> bool {
    let apis = access_info(role).allowed_apis;
    apis.contains(&"*") || apis.contains(&api)
}

pub fn is_admin(user: &AuthUser) -> bool {
    user.role == Role::Admin
}

pub fn require_api(user: &AuthUser, api: &str) -> Result<(), AccessDenied> {
    if can_access_api(user.role, api) {
        Ok(())
    } else {
        Err(AccessDenied::Api {
            role: user.role.as_str(),
            api: api.to_string(),
        })
    }
}

/// `action` completa la frase "Solo administradores pueden ..."
pub fn require_admin(user: &AuthUser, action: &str) -> Result<(), AccessDenied> {
    if is_admin(user) {
        Ok(())
    } else {
        Err(AccessDenied::AdminOnly(action.to_string()))
    }
}

/// Admin ve a cualquier atleta; un usuario solo a los de su equipe.
pub fn check_athlete_access(user: &AuthUser, athlete: &Athlete) -> Result<(), AccessDenied> {
    if is_admin(user) {
        return Ok(());
    }
    let team_id = user.team_id.as_deref().ok_or(AccessDenied::NoTeam)?;
    if athlete.team_id.as_deref() == Some(team_id) {
        Ok(())
    } else {
        Err(AccessDenied::OtherTeam)
    }
}

/// Valida tokens HS256 firmados con JWT_SECRET.
#[derive(Clone)]
pub struct AuthService {
    key: DecodingKey,
    validation: Validation,
}

impl AuthService {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Recibe el valor completo del header Authorization.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthUser, AccessDenied> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AccessDenied::MissingToken)?;

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            log::warn!("JWT rechazado: {}", e);
            AccessDenied::InvalidToken
        })?;

        Ok(data.claims.into())
    }
}
