use super::*;

fn tokens(source: &str) -> Vec<Token<'_>> {
    tokenize(source).unwrap().into_iter().map(|s| s.token).collect()
}

#[test]
fn test_brackets_and_words() {
    assert_eq!(
        tokens("Hello [Name] !"),
        vec![
            Token::Word("Hello"),
            Token::LBracket,
            Token::Word("Name"),
            Token::RBracket,
            Token::Word("!"),
        ]
    );
}

#[test]
fn test_adjacent_calls_split_on_brackets() {
    assert_eq!(
        tokens("[A][B]"),
        vec![
            Token::LBracket,
            Token::Word("A"),
            Token::RBracket,
            Token::LBracket,
            Token::Word("B"),
            Token::RBracket,
        ]
    );
}

#[test]
fn test_variables_drop_the_question_mark() {
    assert_eq!(
        tokens("[Greet ?who] ?who"),
        vec![
            Token::LBracket,
            Token::Word("Greet"),
            Token::Variable("who"),
            Token::RBracket,
            Token::Variable("who"),
        ]
    );
}

#[test]
fn test_question_marks_inside_words_are_text() {
    assert_eq!(tokens("Really? ?"), vec![Token::Word("Really?"), Token::Word("?")]);
}

#[test]
fn test_spans() {
    let spanned = tokenize("  [Go]").unwrap();
    assert_eq!(spanned[0].span, 2..3);
    assert_eq!(spanned[1].span, 3..5);
}

#[test]
fn test_empty_and_blank_input() {
    assert!(tokens("").is_empty());
    assert!(tokens(" \t\n").is_empty());
}
