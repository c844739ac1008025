use super::*;

fn word(w: &str) -> Element {
    Element::Word(w.to_string())
}

fn call(task: &str, args: Vec<Arg>) -> Element {
    Element::Call {
        task: task.to_string(),
        args,
    }
}

fn parse_error(result: EngineResult<impl std::fmt::Debug>) -> String {
    match result {
        Err(EngineError::Parse(msg)) => msg,
        other => panic!("expected a parse error, got {:?}", other),
    }
}

mod bodies {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_words_and_calls() {
        assert_eq!(
            parse_body("Hello [Name] !").unwrap(),
            vec![word("Hello"), call("Name", vec![]), word("!")]
        );
    }

    #[test]
    fn test_call_arguments() {
        assert_eq!(
            parse_body("[Greet Bob ?friend]").unwrap(),
            vec![call(
                "Greet",
                vec![Arg::Word("Bob".to_string()), Arg::Var("friend".to_string())]
            )]
        );
    }

    #[test]
    fn test_empty_body() {
        assert!(parse_body("").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_calls() {
        assert!(parse_error(parse_body("[A")).contains("unclosed"));
        assert!(parse_error(parse_body("A]")).contains("unmatched"));
        assert!(parse_error(parse_body("[]")).contains("empty call"));
        assert!(parse_error(parse_body("[A [B]]")).contains("nested"));
        assert!(parse_error(parse_body("[?x]")).contains("task name"));
    }
}

mod programs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_methods_are_grouped_in_order() {
        let program = parse_program(
            "# greetings\n\
             Greet ?who: Hello ?who\n\
             \n\
             Greet ?who: Hi ?who\n\
             Name: world\n",
        )
        .unwrap();

        assert_eq!(program.task_names(), vec!["Greet", "Name"]);
        let methods = program.methods("Greet").unwrap();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].params, vec!["who".to_string()]);
        assert_eq!(methods[0].body, vec![word("Hello"), Element::Var("who".to_string())]);
        assert_eq!(methods[0].line, 2);
        assert_eq!(methods[1].line, 4);
        assert!(methods[0].accepts(1));
        assert!(!methods[0].accepts(0));
    }

    #[test]
    fn test_only_first_colon_splits() {
        let program = parse_program("Time: it is 10:30").unwrap();
        assert_eq!(
            program.methods("Time").unwrap()[0].body,
            vec![word("it"), word("is"), word("10:30")]
        );
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let msg = parse_error(parse_program("A: ok\nno colon here"));
        assert!(msg.starts_with("line 2:"), "{}", msg);

        let msg = parse_error(parse_program("A: ok\nB: [C"));
        assert!(msg.starts_with("line 2: unclosed"), "{}", msg);
    }

    #[test]
    fn test_bad_headers() {
        assert!(parse_error(parse_program(": body")).contains("missing task name"));
        assert!(parse_error(parse_program("A plain: body")).contains("?parameter"));
        assert!(parse_error(parse_program("A ?x ?x: body")).contains("duplicate"));
    }
}
