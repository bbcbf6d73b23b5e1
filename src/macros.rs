//! Translation convenience macros

/// Translates `key` in the session's current locale. Parameters are given
/// as `name = value` pairs; values are rendered with `Display`.
///
/// ```ignore
/// let greeting = t!(session, "greeting.hello", name = user)?;
/// ```
#[macro_export]
macro_rules! t {
    ($session:expr, $key:expr) => {
        $session.translate($key, &[])
    };
    ($session:expr, $key:expr, $($name:ident = $value:expr),+ $(,)?) => {
        $session.translate($key, &[$((stringify!($name), format!("{}", $value))),+])
    };
}

/// Plural-aware translation. The count picks the plural form and is also
/// available to the template as `{count}`.
#[macro_export]
macro_rules! tn {
    ($session:expr, $key:expr, $count:expr) => {{
        let count = $count;
        $session.translate_plural($key, count, &[("count", format!("{}", count))])
    }};
    ($session:expr, $key:expr, $count:expr, $($name:ident = $value:expr),+ $(,)?) => {{
        let count = $count;
        $session.translate_plural(
            $key,
            count,
            &[
                ("count", format!("{}", count)),
                $((stringify!($name), format!("{}", $value))),+
            ],
        )
    }};
}
