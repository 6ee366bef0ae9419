#[derive(Debug, Clone, PartialEq, Eq)]
/// Экран приложения.
pub enum Route {
    /// `/`, сразу перенаправляется.
    Root,
    /// `/login`
    Login,
    /// `/register`
    Register,
    /// `/dashboard`, защищён.
    Dashboard,
    /// `/create`, защищён.
    Create,
    /// `/posts/:id`, защищён.
    PostDetail(String),
}

impl Route {
    /// Разбирает путь (допускается `#`-префикс, query-строка и завершающий `/`).
    /// Неизвестные пути ведут на [`Route::Root`].
    pub fn parse(path: &str) -> Self {
        let path = path.trim().trim_start_matches('#');
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["dashboard"] => Self::Dashboard,
            ["create"] => Self::Create,
            ["posts", id] => Self::PostDetail((*id).to_string()),
            _ => Self::Root,
        }
    }

    /// Канонический путь экрана.
    pub fn path(&self) -> String {
        match self {
            Self::Root => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Dashboard => "/dashboard".to_string(),
            Self::Create => "/create".to_string(),
            Self::PostDetail(id) => format!("/posts/{id}"),
        }
    }

    /// Требует ли экран входа.
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Dashboard | Self::Create | Self::PostDetail(_))
    }

    /// Экран, который реально увидит пользователь.
    pub fn resolve(self, authenticated: bool) -> Self {
        match self {
            Self::Root if authenticated => Self::Dashboard,
            Self::Root => Self::Login,
            route if route.is_protected() && !authenticated => Self::Login,
            route => route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_paths() {
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("#/register/"), Route::Register);
        assert_eq!(Route::parse("/dashboard?tab=1"), Route::Dashboard);
        assert_eq!(
            Route::parse("/posts/65f0a1"),
            Route::PostDetail("65f0a1".to_string())
        );
        assert_eq!(Route::parse("/posts/"), Route::Root);
        assert_eq!(Route::parse("/nope"), Route::Root);
    }

    #[test]
    fn path_round_trips_through_parse() {
        let route = Route::PostDetail("abc".to_string());
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn root_redirect_depends_on_session() {
        assert_eq!(Route::Root.resolve(true), Route::Dashboard);
        assert_eq!(Route::Root.resolve(false), Route::Login);
    }

    #[test]
    fn protected_routes_require_session() {
        let detail = Route::PostDetail("x".to_string());
        assert_eq!(detail.clone().resolve(false), Route::Login);
        assert_eq!(detail.clone().resolve(true), detail);
        assert_eq!(Route::Login.resolve(true), Route::Login);
    }
}
