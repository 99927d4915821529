//! Concrete paths and path expressions
//!
//! A [`Path`] addresses one node of a value tree. A [`PathExpression`] is a
//! pattern over paths with wildcard steps; a [`PathSet`] holds the
//! expressions a host uses to drop fields or force them to unknown.
//!
//! Expressions have a text form used in configuration files:
//!
//! ```text
//! metadata.annotations                      names
//! spec.containers[*].image                  any index
//! spec.template.metadata.labels.*           any name
//! metadata.annotations["example.com/hash"]  names containing dots
//! ```
//!
//! Matching is exact-length only: `metadata` does not match
//! `metadata.name`, and `metadata.name` does not match `metadata`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// One step of a concrete path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStep {
    /// Field of a record, or key of a dynamically typed object
    Name(String),
    /// Entry of a schema-declared mapping
    Key(String),
    /// Element of a sequence
    Index(usize),
}

impl PathStep {
    fn write_to(&self, f: &mut fmt::Formatter<'_>, first: bool) -> fmt::Result {
        match self {
            Self::Name(name) if is_plain_name(name) => {
                if first {
                    write!(f, "{}", name)
                } else {
                    write!(f, ".{}", name)
                }
            }
            Self::Name(name) | Self::Key(name) => write!(f, "[{}]", quote(name)),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Concrete location of a node inside a value tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<PathStep>);

impl Path {
    /// The empty path addressing the root
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, step: PathStep) {
        self.0.push(step);
    }

    pub fn pop(&mut self) -> Option<PathStep> {
        self.0.pop()
    }

    pub fn at_name(mut self, name: impl Into<String>) -> Self {
        self.0.push(PathStep::Name(name.into()));
        self
    }

    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.0.push(PathStep::Key(key.into()));
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.0.push(PathStep::Index(index));
        self
    }
}

impl From<Vec<PathStep>> for Path {
    fn from(steps: Vec<PathStep>) -> Self {
        Self(steps)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{}", ROOT_TEXT);
        }
        for (i, step) in self.0.iter().enumerate() {
            step.write_to(f, i == 0)?;
        }
        Ok(())
    }
}

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionStep {
    Name(String),
    AnyName,
    Index(usize),
    AnyIndex,
}

impl ExpressionStep {
    /// Whether this step selects `step`
    ///
    /// Name steps select both record fields and mapping keys; index steps
    /// select sequence elements.
    pub fn matches(&self, step: &PathStep) -> bool {
        match (self, step) {
            (Self::Name(expected), PathStep::Name(actual) | PathStep::Key(actual)) => {
                expected == actual
            }
            (Self::AnyName, PathStep::Name(_) | PathStep::Key(_)) => true,
            (Self::Index(expected), PathStep::Index(actual)) => expected == actual,
            (Self::AnyIndex, PathStep::Index(_)) => true,
            _ => false,
        }
    }
}

/// Pattern over concrete paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathExpression(Vec<ExpressionStep>);

impl PathExpression {
    /// Expression matching only the root path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse the text form of an expression
    pub fn parse(expression: &str) -> Result<Self, PathError> {
        ExpressionParser::new(expression).parse()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.push(ExpressionStep::Name(name.into()));
        self
    }

    pub fn any_name(mut self) -> Self {
        self.0.push(ExpressionStep::AnyName);
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.0.push(ExpressionStep::Index(index));
        self
    }

    pub fn any_index(mut self) -> Self {
        self.0.push(ExpressionStep::AnyIndex);
        self
    }

    pub fn steps(&self) -> &[ExpressionStep] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Exact-length, step-wise match
    pub fn matches(&self, path: &Path) -> bool {
        self.0.len() == path.len() && self.matches_prefix_of(path)
    }

    /// Whether this expression could select `path` or one of its descendants
    pub fn reaches(&self, path: &Path) -> bool {
        self.0.len() >= path.len()
            && self
                .0
                .iter()
                .zip(path.steps())
                .all(|(expected, actual)| expected.matches(actual))
    }

    fn matches_prefix_of(&self, path: &Path) -> bool {
        self.0
            .iter()
            .zip(path.steps())
            .all(|(expected, actual)| expected.matches(actual))
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PathExpression {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathExpression> for String {
    fn from(expression: PathExpression) -> Self {
        expression.to_string()
    }
}

/// Text form of the root expression, shared with [`Path`]'s display
const ROOT_TEXT: &str = "(root)";

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{}", ROOT_TEXT);
        }
        for (i, step) in self.0.iter().enumerate() {
            let sep = if i == 0 { "" } else { "." };
            match step {
                ExpressionStep::Name(name)
                    if is_plain_name(name) && name != "*" && name != ROOT_TEXT =>
                {
                    write!(f, "{}{}", sep, name)?
                }
                ExpressionStep::Name(name) => write!(f, "[{}]", quote(name))?,
                ExpressionStep::AnyName => write!(f, "{}*", sep)?,
                ExpressionStep::Index(index) => write!(f, "[{}]", index)?,
                ExpressionStep::AnyIndex => write!(f, "[*]")?,
            }
        }
        Ok(())
    }
}

/// Set of path expressions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathSet(Vec<PathExpression>);

impl PathSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse every expression, failing on the first malformed one
    pub fn parse_all<I, S>(expressions: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        expressions
            .into_iter()
            .map(|e| PathExpression::parse(e.as_ref()))
            .collect()
    }

    pub fn push(&mut self, expression: PathExpression) {
        self.0.push(expression);
    }

    pub fn with(mut self, expression: PathExpression) -> Self {
        self.0.push(expression);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathExpression> {
        self.0.iter()
    }

    /// True iff some expression matches `path` exactly
    pub fn matches(&self, path: &Path) -> bool {
        self.0.iter().any(|e| e.matches(path))
    }

    /// True iff some expression selects `path` or a descendant of it
    pub fn reaches(&self, path: &Path) -> bool {
        self.0.iter().any(|e| e.reaches(path))
    }
}

impl FromIterator<PathExpression> for PathSet {
    fn from_iter<I: IntoIterator<Item = PathExpression>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<PathExpression> for PathSet {
    fn extend<I: IntoIterator<Item = PathExpression>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a PathSet {
    type Item = &'a PathExpression;
    type IntoIter = std::slice::Iter<'a, PathExpression>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', '[', ']', '"', '\\'])
}

fn quote(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Parser for the text form of a path expression
struct ExpressionParser<'a> {
    expression: &'a str,
    chars: Vec<(usize, char)>,
    cursor: usize,
}

impl<'a> ExpressionParser<'a> {
    fn new(expression: &'a str) -> Self {
        Self {
            expression,
            chars: expression.char_indices().collect(),
            cursor: 0,
        }
    }

    fn parse(mut self) -> Result<PathExpression, PathError> {
        if self.expression.is_empty() {
            return Err(PathError::Empty);
        }
        if self.expression == ROOT_TEXT {
            return Ok(PathExpression::root());
        }

        let mut steps = Vec::new();
        // a name is required at the start and after every '.'
        let mut need_name = true;

        while let Some(&(position, c)) = self.chars.get(self.cursor) {
            match c {
                '.' => {
                    if need_name {
                        return Err(self.empty_step(position));
                    }
                    need_name = true;
                    self.cursor += 1;
                }
                '[' => {
                    if need_name && !steps.is_empty() {
                        return Err(self.empty_step(position));
                    }
                    steps.push(self.bracket(position)?);
                    need_name = false;
                }
                _ => {
                    if !need_name {
                        return Err(self.unexpected(position, c));
                    }
                    steps.push(self.name()?);
                    need_name = false;
                }
            }
        }

        if need_name {
            return Err(self.empty_step(self.expression.len()));
        }

        Ok(PathExpression(steps))
    }

    fn name(&mut self) -> Result<ExpressionStep, PathError> {
        let mut name = String::new();
        while let Some(&(position, c)) = self.chars.get(self.cursor) {
            match c {
                '.' | '[' => break,
                ']' | '"' | '\\' => return Err(self.unexpected(position, c)),
                _ => name.push(c),
            }
            self.cursor += 1;
        }

        Ok(if name == "*" {
            ExpressionStep::AnyName
        } else {
            ExpressionStep::Name(name)
        })
    }

    fn bracket(&mut self, open: usize) -> Result<ExpressionStep, PathError> {
        // skip '['
        self.cursor += 1;

        if matches!(self.chars.get(self.cursor), Some((_, '"'))) {
            let name = self.quoted(open)?;
            return match self.chars.get(self.cursor) {
                Some((_, ']')) => {
                    self.cursor += 1;
                    Ok(ExpressionStep::Name(name))
                }
                Some(&(position, c)) => Err(self.unexpected(position, c)),
                None => Err(self.unclosed(open)),
            };
        }

        let mut content = String::new();
        loop {
            match self.chars.get(self.cursor) {
                Some((_, ']')) => {
                    self.cursor += 1;
                    break;
                }
                Some(&(_, c)) => {
                    content.push(c);
                    self.cursor += 1;
                }
                None => return Err(self.unclosed(open)),
            }
        }

        if content == "*" {
            return Ok(ExpressionStep::AnyIndex);
        }

        content
            .parse::<usize>()
            .map(ExpressionStep::Index)
            .map_err(|_| PathError::InvalidIndex {
                expression: self.expression.to_string(),
                index: content,
            })
    }

    fn quoted(&mut self, open: usize) -> Result<String, PathError> {
        // skip opening quote
        self.cursor += 1;

        let mut name = String::new();
        let mut escaped = false;
        loop {
            let Some(&(_, c)) = self.chars.get(self.cursor) else {
                return Err(self.unclosed(open));
            };
            self.cursor += 1;

            match c {
                _ if escaped => {
                    name.push(c);
                    escaped = false;
                }
                '\\' => escaped = true,
                '"' => return Ok(name),
                _ => name.push(c),
            }
        }
    }

    fn empty_step(&self, position: usize) -> PathError {
        PathError::EmptyStep {
            expression: self.expression.to_string(),
            position,
        }
    }

    fn unclosed(&self, position: usize) -> PathError {
        PathError::UnclosedBracket {
            expression: self.expression.to_string(),
            position,
        }
    }

    fn unexpected(&self, position: usize, found: char) -> PathError {
        PathError::UnexpectedCharacter {
            expression: self.expression.to_string(),
            position,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(s: &str) -> PathExpression {
        PathExpression::parse(s).unwrap()
    }

    #[test]
    fn test_parse_names_and_indexes() {
        assert_eq!(
            expr("spec.containers[0].image"),
            PathExpression::root()
                .name("spec")
                .name("containers")
                .index(0)
                .name("image")
        );
        assert_eq!(
            expr("spec.containers[*].ports.*"),
            PathExpression::root()
                .name("spec")
                .name("containers")
                .any_index()
                .name("ports")
                .any_name()
        );
    }

    #[test]
    fn test_parse_quoted_names() {
        assert_eq!(
            expr(r#"metadata.annotations["app.kubernetes.io/name"]"#),
            PathExpression::root()
                .name("metadata")
                .name("annotations")
                .name("app.kubernetes.io/name")
        );
        assert_eq!(
            expr(r#"["a\"b"]"#),
            PathExpression::root().name("a\"b")
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(PathExpression::parse(""), Err(PathError::Empty));
        assert!(matches!(
            PathExpression::parse("metadata..name"),
            Err(PathError::EmptyStep { position: 9, .. })
        ));
        assert!(matches!(
            PathExpression::parse("metadata."),
            Err(PathError::EmptyStep { .. })
        ));
        assert!(matches!(
            PathExpression::parse(".metadata"),
            Err(PathError::EmptyStep { position: 0, .. })
        ));
        assert!(matches!(
            PathExpression::parse("items[0"),
            Err(PathError::UnclosedBracket { position: 5, .. })
        ));
        assert!(matches!(
            PathExpression::parse("items[x]"),
            Err(PathError::InvalidIndex { .. })
        ));
        assert!(matches!(
            PathExpression::parse("items[0]name"),
            Err(PathError::UnexpectedCharacter { found: 'n', .. })
        ));
        assert!(matches!(
            PathExpression::parse("metadata.[0]"),
            Err(PathError::EmptyStep { .. })
        ));
    }

    #[test]
    fn test_display_round_trips() {
        for text in [
            "status",
            "spec.containers[*].image",
            "metadata.labels.*",
            r#"metadata.annotations["example.com/hash"]"#,
            "[3].name",
            "(root)",
        ] {
            assert_eq!(expr(text).to_string(), text);
        }
        assert_eq!(expr("(root)"), PathExpression::root());
        let named = PathExpression::root().name("(root)");
        assert_eq!(named.to_string(), r#"["(root)"]"#);
        assert_eq!(expr(&named.to_string()), named);
    }

    #[test]
    fn test_exact_length_matching() {
        let set = PathSet::parse_all(["metadata.name"]).unwrap();

        assert!(set.matches(&Path::root().at_name("metadata").at_name("name")));
        assert!(!set.matches(&Path::root().at_name("metadata")));
        assert!(!set.matches(
            &Path::root()
                .at_name("metadata")
                .at_name("name")
                .at_name("x")
        ));
    }

    #[test]
    fn test_wildcards_match_their_category_only() {
        let any_index = expr("items[*]");
        assert!(any_index.matches(&Path::root().at_name("items").at_index(7)));
        assert!(!any_index.matches(&Path::root().at_name("items").at_name("7")));

        let any_name = expr("labels.*");
        assert!(any_name.matches(&Path::root().at_name("labels").at_key("app")));
        assert!(any_name.matches(&Path::root().at_name("labels").at_name("app")));
        assert!(!any_name.matches(&Path::root().at_name("labels").at_index(0)));
    }

    #[test]
    fn test_name_matches_mapping_key() {
        let e = expr(r#"metadata.labels["app"]"#);
        assert!(e.matches(&Path::root().at_name("metadata").at_name("labels").at_key("app")));
    }

    #[test]
    fn test_empty_set_matches_nothing() {
        assert!(!PathSet::new().matches(&Path::root()));
        assert!(PathSet::new().with(PathExpression::root()).matches(&Path::root()));
    }

    #[test]
    fn test_reaches_descendants() {
        let set = PathSet::parse_all(["metadata.uid"]).unwrap();
        assert!(set.reaches(&Path::root()));
        assert!(set.reaches(&Path::root().at_name("metadata")));
        assert!(set.reaches(&Path::root().at_name("metadata").at_name("uid")));
        assert!(!set.reaches(&Path::root().at_name("spec")));
    }

    #[test]
    fn test_path_display() {
        let path = Path::root()
            .at_name("spec")
            .at_name("containers")
            .at_index(0)
            .at_name("env")
            .at_key("HTTP_PORT");
        insta::assert_snapshot!(path.to_string(), @r#"spec.containers[0].env["HTTP_PORT"]"#);
        assert_eq!(Path::root().to_string(), "(root)");
    }

    #[test]
    fn test_deserialize_path_set() {
        let set: PathSet =
            serde_json::from_value(serde_json::json!(["status", "metadata.managedFields"]))
                .unwrap();
        assert_eq!(set.len(), 2);

        let bad: std::result::Result<PathSet, _> =
            serde_json::from_value(serde_json::json!(["metadata..name"]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_root_expression_serde_round_trip() {
        let set = PathSet::new()
            .with(PathExpression::root())
            .with(expr("metadata.uid"));

        let text = serde_json::to_value(&set).unwrap();
        assert_eq!(text, serde_json::json!(["(root)", "metadata.uid"]));

        let back: PathSet = serde_json::from_value(text).unwrap();
        assert_eq!(back, set);
        assert!(back.matches(&Path::root()));
    }
}
