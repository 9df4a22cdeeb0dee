use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;

// Единственный вход в панель: учетные данные администратора из конфигурации
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: String,
}

// Разбор заголовка Basic auth в пару (пользователь, ключ)
fn decode_basic(auth_header: &str) -> Option<(String, String)> {
    let encoded = auth_header.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (user, key) = credentials.split_once(':')?;
    Some((user.to_string(), key.to_string()))
}

// Basic Auth extractor
impl FromRequestParts<Arc<crate::AppState>> for AdminUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Получаем заголовок Authorization
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let (user, key) = decode_basic(auth_header).ok_or(StatusCode::UNAUTHORIZED)?;

        // Сверяем с настроенными учетными данными
        if user != state.config.auth.admin_user || key != state.config.auth.admin_access_key {
            return Err(StatusCode::UNAUTHORIZED);
        }

        Ok(AdminUser { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};

    fn basic(credentials: &str) -> String {
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }

    #[test]
    fn decodes_user_and_key() {
        assert_eq!(
            decode_basic(&basic("admin:secret")),
            Some(("admin".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn key_may_contain_colons() {
        assert_eq!(
            decode_basic(&basic("admin:a:b:c")),
            Some(("admin".to_string(), "a:b:c".to_string()))
        );
    }

    #[test]
    fn rejects_non_basic_schemes() {
        assert_eq!(decode_basic("Bearer abc"), None);
        assert_eq!(decode_basic("Basic not-base64!!!"), None);
        assert_eq!(
            decode_basic(&format!(
                "Basic {}",
                general_purpose::STANDARD.encode("no-colon")
            )),
            None
        );
    }
}
