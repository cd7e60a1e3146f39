use std::fmt;

/// Where the console goes after an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    /// Login page with the "session expired" banner.
    LoginExpired,
    Register,
    Token,
    Setting,
    /// External page, e.g. a top-up link or OAuth authorize URL.
    External(String),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::LoginExpired => "/login?expired=true",
            Route::Register => "/register",
            Route::Token => "/token",
            Route::Setting => "/setting",
            Route::External(url) => url,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
