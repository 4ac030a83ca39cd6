use minijinja::Value;

/// `quote(value)`: quotes one argument for a POSIX shell.
///
/// `none` quotes as the empty string.
pub fn quote(value: Value) -> String {
    let text = if value.is_none() || value.is_undefined() {
        String::new()
    } else {
        value.to_string()
    };
    shell_words::quote(&text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote(Value::from("hello world")), "'hello world'");
        assert_eq!(quote(Value::from("plain")), "plain");
        assert_eq!(quote(Value::from(())), "''");
    }

    #[test]
    fn test_quoted_value_splits_back_to_one_word() {
        let quoted = quote(Value::from("it's a $HOME `test`"));
        assert_eq!(
            shell_words::split(&quoted).unwrap(),
            vec!["it's a $HOME `test`".to_string()]
        );
    }
}
