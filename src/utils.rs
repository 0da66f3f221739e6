//! # Utility Functions Module
//!
//! Small helpers for building argument lists for external tools.

/// Converts any iterable of displayable items into owned argument strings.
///
/// # Example
/// ```rust
/// use fasterdl::utils::to_string_vec;
///
/// let level = 9;
/// let args = to_string_vec(["a", "-tbzip2", &format!("-mx={}", level)]);
/// assert_eq!(args, vec!["a", "-tbzip2", "-mx=9"]);
/// ```
pub fn to_string_vec<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

/// Builds a `Vec<String>` of command arguments from mixed expressions.
///
/// ```rust
/// use fasterdl::args;
///
/// let dest = "out/file.vtf.bz2";
/// let args = args!["a", "-y", dest];
/// assert_eq!(args.len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        $crate::utils::to_string_vec([$($item.to_string()),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_string_vec_paths() {
        let source = std::path::Path::new("maps/test.bsp");
        let result = to_string_vec(["a", &source.display().to_string()]);
        assert_eq!(result, vec!["a".to_string(), "maps/test.bsp".to_string()]);
    }

    #[test]
    fn test_to_string_vec_empty() {
        let result: Vec<String> = to_string_vec(Vec::<&str>::new());
        assert!(result.is_empty());
    }

    #[test]
    fn test_args_macro_mixed_types() {
        let level = 9;
        let result = args!["a", "-tbzip2", format!("-mx={}", level), "-mmt=off"];
        assert_eq!(result, vec!["a", "-tbzip2", "-mx=9", "-mmt=off"]);
    }
}
