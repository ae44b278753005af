use super::error::TreeError;
use super::node::NodeId;
use super::tree::Tree;
use nom::{
    branch::alt,
    bytes::complete::{is_not, take_while},
    character::complete::{char, digit1, multispace0},
    combinator::{cut, map, map_res, opt, recognize},
    error::{context, ContextError, ErrorKind, FromExternalError, ParseError},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Offset, Parser,
};

// ================================================================================================
// Error Handling Structures
// ================================================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum DetailedErrorKind {
    Context(&'static str),
    Nom(ErrorKind),
}

/// A custom error type for nom that accumulates context and error kinds.
/// This allows for more informative error messages when parsing fails.
#[derive(Clone, Debug, PartialEq)]
pub struct DetailedError<'a> {
    pub errors: Vec<(&'a str, DetailedErrorKind)>,
}

impl<'a> ParseError<&'a str> for DetailedError<'a> {
    fn from_error_kind(input: &'a str, kind: ErrorKind) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }

    fn append(input: &'a str, kind: ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Nom(kind)));
        other
    }
}

impl<'a> ContextError<&'a str> for DetailedError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, DetailedErrorKind::Context(ctx)));
        other
    }
}

impl<'a, E> FromExternalError<&'a str, E> for DetailedError<'a> {
    fn from_external_error(input: &'a str, kind: ErrorKind, _e: E) -> Self {
        DetailedError {
            errors: vec![(input, DetailedErrorKind::Nom(kind))],
        }
    }
}

// ================================================================================================
// Intermediate Structure
// ================================================================================================

/// Recursive node built while parsing, flattened into the `Tree` arena afterwards.
#[derive(Debug, Default)]
struct ParsedNode {
    name: Option<String>,
    length: Option<f64>,
    children: Vec<ParsedNode>,
}

impl ParsedNode {
    /// Moves this node and its descendants into the arena.
    /// Returns the `NodeId` of the created node.
    fn into_tree(self, tree: &mut Tree) -> Result<NodeId, TreeError> {
        let id = tree.add_node();
        for child in self.children {
            let child_id = child.into_tree(tree)?;
            tree.add_child(id, child_id)?;
        }
        if let Some(node) = tree.get_node_mut(id) {
            node.name = self.name;
            node.length = self.length;
        }
        Ok(id)
    }
}

// ================================================================================================
// Parsers
// ================================================================================================

// 1. Whitespace eater
// Wraps another parser and ignores surrounding whitespace (spaces, tabs, newlines).
fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

// 2. Label
// Supports:
// - Unquoted strings (stops at reserved chars: "():;,[]"), trimmed
// - Single quoted strings ('Homo sapiens')
// - Double quoted strings ("Homo sapiens")
// A quoted label runs to the next matching quote; `''` is not an escape.
fn parse_label(input: &str) -> IResult<&str, String, DetailedError<'_>> {
    let unquoted = map(
        take_while(|c: char| !"():;,[]".contains(c)),
        |s: &str| s.trim().to_string(),
    );

    let single_quoted = delimited(
        char('\''),
        map(is_not("'"), |s: &str| s.to_string()),
        char('\''),
    );

    let double_quoted = delimited(
        char('"'),
        map(is_not("\""), |s: &str| s.to_string()),
        char('"'),
    );

    // Try quoted formats first, then fall back to unquoted
    context("label", alt((single_quoted, double_quoted, unquoted))).parse(input)
}

// 3. Length
// Parses the branch length after a colon, including scientific notation.
fn parse_length(input: &str) -> IResult<&str, f64, DetailedError<'_>> {
    context(
        "length",
        preceded(
            ws(char(':')),
            // `cut`: a ':' without a number is an error, not a backtrack point.
            cut(map_res(
                recognize((
                    opt(char('-')),
                    digit1,
                    opt((char('.'), digit1)),
                    opt((
                        alt((char('e'), char('E'))),
                        opt(alt((char('+'), char('-')))),
                        digit1,
                    )),
                )),
                |s: &str| s.parse::<f64>(),
            )),
        ),
    )
    .parse(input)
}

// 4. Comment
// Bracketed comments (NHX included) carry nothing the scoring engine uses.
fn parse_comment(input: &str) -> IResult<&str, (), DetailedError<'_>> {
    context(
        "comment",
        map(
            opt(delimited(
                ws(char('[')),
                take_while(|c| c != ']'),
                char(']'),
            )),
            |_| (),
        ),
    )
    .parse(input)
}

// 5. Subtree
// General Newick Structure: (child1, child2, ...)Label:Length[Comment]
fn parse_subtree(input: &str) -> IResult<&str, ParsedNode, DetailedError<'_>> {
    let (input, children) = context(
        "children",
        opt(delimited(
            ws(char('(')),
            separated_list1(ws(char(',')), parse_subtree),
            ws(char(')')),
        )),
    )
    .parse(input)?;

    let (input, label) = opt(parse_label).parse(input)?;

    // Comments may appear before or after the length.
    let (input, _) = parse_comment(input)?;
    let (input, length) = opt(parse_length).parse(input)?;
    let (input, _) = parse_comment(input)?;

    let node = ParsedNode {
        name: label.filter(|l| !l.is_empty()),
        length,
        children: children.unwrap_or_default(),
    };

    Ok((input, node))
}

// ================================================================================================
// Entry Point
// ================================================================================================

/// Parses a single Newick tree string.
/// Expects the tree to end with a semicolon ';'.
pub fn parse_newick(input: &str) -> Result<Tree, TreeError> {
    let mut parser = (ws(parse_subtree), ws(char(';')));

    match parser.parse(input) {
        Ok((_, (root_node, _))) => {
            let mut tree = Tree::new();
            let root_id = root_node.into_tree(&mut tree)?;
            tree.set_root(root_id);
            Ok(tree)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(make_tree_error(input, e)),
        Err(nom::Err::Incomplete(_)) => Err(TreeError::ParseError {
            message: "Incomplete input".to_string(),
            line: 0,
            column: 0,
            snippet: "".to_string(),
        }),
    }
}

// Helper to convert nom errors into friendly TreeError
fn make_tree_error(input: &str, e: DetailedError) -> TreeError {
    let remaining = e.errors.first().map(|(rest, _)| *rest).unwrap_or(input);
    let offset = input.offset(remaining);

    // Calculate line/col
    let prefix = &input[..offset];
    let line = prefix.chars().filter(|&c| c == '\n').count() + 1;
    let last_newline = prefix.rfind('\n').map(|p| p + 1).unwrap_or(0);
    let column = offset - last_newline + 1;

    let mut message = String::new();
    for (_, kind) in e.errors.iter().rev() {
        match kind {
            DetailedErrorKind::Context(ctx) => {
                message.push_str(&format!("while parsing {}:\n", ctx));
            }
            DetailedErrorKind::Nom(k) => {
                message.push_str(&format!("  error: {:?}\n", k));
            }
        }
    }

    TreeError::ParseError {
        message,
        line,
        column,
        snippet: remaining.chars().take(50).collect(),
    }
}

impl Tree {
    /// Parse a Newick string into a Tree.
    ///
    /// # Example
    /// ```
    /// use phylodist::libs::phylo::Tree;
    ///
    /// let tree = Tree::from_newick("(A:0.1,B:0.2)Root;").unwrap();
    /// assert_eq!(tree.len(), 3);
    ///
    /// assert!(Tree::from_newick("(A,B:invalid)C;").is_err());
    /// ```
    pub fn from_newick(input: &str) -> Result<Self, TreeError> {
        parse_newick(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_simple() {
        let input = "(A,B)C;";
        let tree = Tree::from_newick(input).unwrap();
        assert_eq!(tree.len(), 3);

        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert_eq!(root.name.as_deref(), Some("C"));
        assert_eq!(root.children.len(), 2);
    }

    #[test]
    fn test_parser_lengths() {
        let input = "(A:0.1, B:0.2e-1)Root:100;";
        let tree = Tree::from_newick(input).unwrap();

        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert_eq!(root.length, Some(100.0));

        let child1 = tree.get_node(root.children[0]).unwrap();
        assert_eq!(child1.name.as_deref(), Some("A"));
        assert_eq!(child1.length, Some(0.1));

        let child2 = tree.get_node(root.children[1]).unwrap();
        assert_eq!(child2.length, Some(0.02)); // 0.2e-1
    }

    #[test]
    fn test_parser_comments_are_skipped() {
        let input = "(A:0.1[&&NHX:S=human],B[note]:0.2)n1[&&NHX:E=1.5];";
        let tree = Tree::from_newick(input).unwrap();
        assert_eq!(tree.len(), 3);

        let root = tree.get_node(tree.get_root().unwrap()).unwrap();
        assert_eq!(root.name.as_deref(), Some("n1"));
        let b = tree.get_node(root.children[1]).unwrap();
        assert_eq!(b.name.as_deref(), Some("B"));
        assert_eq!(b.length, Some(0.2));
    }

    #[test]
    fn test_parser_multiline_whitespace() {
        let input = "
        (
            Homo_sapiens : 0.1,
            Pan_troglodytes : 0.2
        ) ;
        ";
        let tree = Tree::from_newick(input).unwrap();
        assert_eq!(tree.len(), 3);
        assert_eq!(
            tree.get_leaf_names(),
            vec![
                Some("Homo_sapiens".to_string()),
                Some("Pan_troglodytes".to_string())
            ]
        );
    }

    #[test]
    fn test_parser_quoted() {
        let input = "('Homo sapiens':0.1, \"Mus musculus\":0.2);";
        let tree = Tree::from_newick(input).unwrap();
        let root = tree.get_node(tree.get_root().unwrap()).unwrap();

        let c1 = tree.get_node(root.children[0]).unwrap();
        assert_eq!(c1.name.as_deref(), Some("Homo sapiens"));

        let c2 = tree.get_node(root.children[1]).unwrap();
        assert_eq!(c2.name.as_deref(), Some("Mus musculus"));

        // reserved characters are literal inside quotes
        let tree = Tree::from_newick("('Felis (cat), domestic':1,B:2);").unwrap();
        assert!(tree.get_node_by_name("Felis (cat), domestic").is_some());
        assert_eq!(tree.get_leaves().len(), 2);
    }

    #[test]
    fn test_parser_error() {
        // Missing semicolon
        let res = Tree::from_newick("(A,B)C");
        match res {
            Err(TreeError::ParseError { line, column, .. }) => {
                assert_eq!(line, 1);
                assert_eq!(column, 7);
            }
            _ => panic!("Expected ParseError, got {:?}", res),
        }

        // Invalid length
        let res2 = Tree::from_newick("(A,B:invalid)C;");
        match res2 {
            Err(TreeError::ParseError { message, .. }) => {
                assert!(message.contains("length"));
            }
            _ => panic!("Expected ParseError, got {:?}", res2),
        }
    }
}
