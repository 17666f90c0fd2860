//! Tests for CLI utilities

#[cfg(test)]
mod tests {
    use super::super::compile::{output_path, serialize};
    use super::super::utils::display_name;
    use kestrel_core::bytecode::Instruction;
    use kestrel_core::pipeline::Pipeline;
    use kestrel_core::source::read_source;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn test_read_source_from_file() {
        let temp_path = std::env::temp_dir().join("kestrel_cli_test_read.kes");
        let content = "x = 42";
        fs::write(&temp_path, content).unwrap();

        let result = read_source(temp_path.to_str().unwrap());
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), content);

        // Cleanup
        let _ = fs::remove_file(temp_path);
    }

    #[test]
    fn test_read_source_nonexistent_file() {
        let err = read_source("/nonexistent/file/path.kes").unwrap_err();
        assert!(
            err.to_string()
                .starts_with("failed to read '/nonexistent/file/path.kes': ")
        );
    }

    #[test]
    fn test_read_source_empty_file() {
        let temp_path = std::env::temp_dir().join("kestrel_cli_test_empty.kes");
        fs::write(&temp_path, "").unwrap();

        let result = read_source(temp_path.to_str().unwrap());
        assert_eq!(result.unwrap(), "");

        // Cleanup
        let _ = fs::remove_file(temp_path);
    }

    #[test]
    fn test_stdin_display_name() {
        assert_eq!(display_name("-"), "<stdin>");
        assert_eq!(display_name("main.kes"), "main.kes");
    }

    #[test]
    fn test_output_path_defaults_to_kbc() {
        assert_eq!(
            output_path("demo/main.kes", None),
            Some(PathBuf::from("demo/main.kbc"))
        );
        assert_eq!(
            output_path("main.kes", Some("out.ron")),
            Some(PathBuf::from("out.ron"))
        );
    }

    #[test]
    fn test_stdin_needs_explicit_output() {
        assert_eq!(output_path("-", None), None);
        let explicit = output_path("-", Some("a.kbc"));
        assert_eq!(explicit, Some(PathBuf::from("a.kbc")));
    }

    #[test]
    fn test_serialized_bytecode_reads_back() {
        let code = Pipeline::new().compile("x = 1\nprint(x + 2)").unwrap();
        let text = serialize(&code).unwrap();
        let restored: Vec<Instruction> = ron::from_str(&text).unwrap();
        assert_eq!(restored, code);
    }
}
