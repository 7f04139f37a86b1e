//! tests/access_tests.rs
//! Pruebas de permisos por rol y validación de JWT.

#[cfg(test)]
mod tests {
    use crate::models::{athlete_model::Athlete, auth_model::Role};
    use crate::services::access_control::{
        access_info, can_access_api, can_access_page, check_athlete_access, require_admin,
        require_api, AccessDenied, AuthService,
    };
    use crate::tests::{test_user, token_for, TEST_SECRET};

    fn athlete_of(team: Option<&str>) -> Athlete {
        Athlete {
            id: "a-1".to_string(),
            name: "Maria".to_string(),
            cpf: "12345678900".to_string(),
            registration_number: None,
            birth_date: None,
            team_id: team.map(str::to_string),
        }
    }

    #[test]
    fn admin_has_wildcard_api_access() {
        assert!(can_access_api(Role::Admin, "equipes"));
        assert!(can_access_api(Role::Admin, "cualquier-cosa"));
        assert_eq!(access_info(Role::Admin).allowed_apis, &["*"]);
    }

    #[test]
    fn usuario_api_list_is_limited() {
        assert!(can_access_api(Role::Usuario, "carteirinhas"));
        assert!(can_access_api(Role::Usuario, "documentos"));
        assert!(!can_access_api(Role::Usuario, "equipes"));
    }

    #[test]
    fn page_access_by_role() {
        assert!(can_access_page(Role::Admin, "equipes"));
        assert!(!can_access_page(Role::Usuario, "equipes"));
        assert!(can_access_page(Role::Usuario, "dashboard"));
        assert!(!can_access_page(Role::Admin, "inexistente"));
    }

    #[test]
    fn require_api_reports_role_and_api() {
        let user = test_user(Role::Usuario, Some("t-1"));
        let err = require_api(&user, "equipes").unwrap_err();
        assert_eq!(
            err,
            AccessDenied::Api {
                role: "usuario",
                api: "equipes".to_string()
            }
        );
        assert!(require_api(&user, "atletas").is_ok());
    }

    #[test]
    fn require_admin_rejects_usuario() {
        assert!(require_admin(&test_user(Role::Admin, None), "x").is_ok());
        assert!(matches!(
            require_admin(&test_user(Role::Usuario, Some("t-1")), "x"),
            Err(AccessDenied::AdminOnly(_))
        ));
    }

    #[test]
    fn admin_can_access_any_athlete() {
        let admin = test_user(Role::Admin, None);
        assert!(check_athlete_access(&admin, &athlete_of(Some("t-9"))).is_ok());
        assert!(check_athlete_access(&admin, &athlete_of(None)).is_ok());
    }

    #[test]
    fn usuario_without_team_is_rejected() {
        let user = test_user(Role::Usuario, None);
        assert_eq!(
            check_athlete_access(&user, &athlete_of(Some("t-1"))),
            Err(AccessDenied::NoTeam)
        );
    }

    #[test]
    fn usuario_only_reaches_own_team() {
        let user = test_user(Role::Usuario, Some("t-1"));
        assert!(check_athlete_access(&user, &athlete_of(Some("t-1"))).is_ok());
        assert_eq!(
            check_athlete_access(&user, &athlete_of(Some("t-2"))),
            Err(AccessDenied::OtherTeam)
        );
        assert_eq!(
            check_athlete_access(&user, &athlete_of(None)),
            Err(AccessDenied::OtherTeam)
        );
    }

    #[test]
    fn authenticate_accepts_valid_bearer_token() {
        let auth = AuthService::new(TEST_SECRET);
        let header = format!("Bearer {}", token_for(Role::Usuario, Some("t-1")));

        let user = auth.authenticate(Some(&header)).unwrap();
        assert_eq!(user.role, Role::Usuario);
        assert_eq!(user.team_id.as_deref(), Some("t-1"));
        assert_eq!(user.display_name(), "Tester");
    }

    #[test]
    fn authenticate_rejects_missing_and_bad_tokens() {
        let auth = AuthService::new(TEST_SECRET);
        assert_eq!(auth.authenticate(None), Err(AccessDenied::MissingToken));
        assert_eq!(auth.authenticate(Some("Bearer ")), Err(AccessDenied::MissingToken));
        assert_eq!(auth.authenticate(Some("Bearer")), Err(AccessDenied::MissingToken));
        let basic = format!("Basic {}", token_for(Role::Admin, None));
        assert_eq!(auth.authenticate(Some(&basic)), Err(AccessDenied::MissingToken));
        assert_eq!(
            auth.authenticate(Some("Bearer no-es-un-jwt")),
            Err(AccessDenied::InvalidToken)
        );

        let other = AuthService::new("otro-secreto");
        let header = format!("Bearer {}", token_for(Role::Admin, None));
        assert_eq!(other.authenticate(Some(&header)), Err(AccessDenied::InvalidToken));
    }
}
