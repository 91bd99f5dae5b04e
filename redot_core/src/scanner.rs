//! Pattern-based detection of function-like declarations.
//!
//! Each [`DeclarationRule`] recognises one declaration shape on its own; the
//! scanner pools the matches of every rule and orders them by offset. Rules
//! overlap on purpose, duplicates are collapsed later by span.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::source::SourceFile;

/// Names that look like a call-like declaration head but are keywords.
pub const EXCLUDED_NAMES: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "function", "await", "return",
];

const IDENT: &str = r"[A-Za-z_$][\w$]*";

/// Declaration shape recognised by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// `function name(`, with optional `export`, `default`, `async`, `*`.
    Function,
    /// `const name = function (`.
    FunctionExpression,
    /// `const name = (params) =>`.
    ArrowFunction,
    /// `const name = param =>`.
    BareArrowFunction,
    /// Class method with optional modifier and return type.
    Method,
    /// `constructor(`.
    Constructor,
    /// `get name(` / `set name(`.
    Accessor,
    /// `*name(` / `async *name(`.
    GeneratorMethod,
    /// Object literal shorthand `name(params) {`.
    ObjectMethod,
    /// `#name(`.
    PrivateMethod,
}

/// One declaration shape and the expression that finds it.
#[derive(Debug)]
pub struct DeclarationRule {
    kind: DeclarationKind,
    pattern: Regex,
}

impl DeclarationRule {
    fn new(kind: DeclarationKind, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            kind,
            pattern: Regex::new(pattern)?,
        })
    }

    /// Shape this rule recognises.
    #[must_use]
    pub const fn kind(&self) -> DeclarationKind {
        self.kind
    }

    /// Every non-overlapping match in `text` as `(name, start offset)`,
    /// excluding keyword names.
    pub fn matches<'t>(&'t self, text: &'t str) -> impl Iterator<Item = (String, usize)> + 't {
        self.pattern.captures_iter(text).filter_map(|captures| {
            let whole = captures.get(0)?;
            let name = captures.name("name")?.as_str();
            if EXCLUDED_NAMES.contains(&name) {
                return None;
            }

            let name = match captures.name("accessor") {
                Some(accessor) => format!("{} {name}", accessor.as_str()),
                None => name.to_owned(),
            };
            let matched = whole.as_str();
            let leading = matched.len() - matched.trim_start().len();
            Some((name, whole.start() + leading))
        })
    }
}

/// A declaration found by a rule; not yet resolved to a span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationCandidate {
    /// Declared name.
    pub name: String,
    /// Byte offset of the declaration start.
    pub start_offset: usize,
    /// 1-based line of `start_offset`.
    pub start_line: u32,
    /// Rule that produced the candidate.
    pub kind: DeclarationKind,
}

#[allow(clippy::expect_used)]
static DEFAULT_RULES: Lazy<Vec<DeclarationRule>> = Lazy::new(|| {
    default_rule_patterns()
        .into_iter()
        .map(|(kind, pattern)| {
            DeclarationRule::new(kind, &pattern).expect("declaration rule pattern is valid")
        })
        .collect()
});

fn default_rule_patterns() -> Vec<(DeclarationKind, String)> {
    let binding = r"\b(?:export\s+)?(?:const|let|var)\s+";
    vec![
        (
            DeclarationKind::Function,
            format!(
                r"\b(?:export\s+(?:default\s+)?)?(?:async\s+)?function(?:\s*\*\s*|\s+)(?P<name>{IDENT})\s*\("
            ),
        ),
        (
            DeclarationKind::FunctionExpression,
            format!(
                r"{binding}(?P<name>{IDENT})\s*=\s*(?:async\s+)?function\b\s*\*?\s*(?:{IDENT}\s*)?\("
            ),
        ),
        (
            DeclarationKind::ArrowFunction,
            format!(r"{binding}(?P<name>{IDENT})\s*=\s*(?:async\s+)?\([^)]*\)\s*=>"),
        ),
        (
            DeclarationKind::BareArrowFunction,
            format!(r"{binding}(?P<name>{IDENT})\s*=\s*(?:async\s+)?{IDENT}\s*=>"),
        ),
        (
            DeclarationKind::Method,
            format!(
                r"(?:\b(?:public|private|protected|static|readonly)\s+)?(?:async\s+)?(?P<name>{IDENT})\s*\([^)]*\)\s*(?::\s*[\w$.<>\[\]]+\s*)?\{{"
            ),
        ),
        (
            DeclarationKind::Constructor,
            r"\b(?P<name>constructor)\s*\([^)]*\)\s*\{".to_string(),
        ),
        (
            DeclarationKind::Accessor,
            format!(r"\b(?P<accessor>get|set)\s+(?P<name>{IDENT})\s*\("),
        ),
        (
            DeclarationKind::GeneratorMethod,
            format!(r"(?:\basync\s+)?\*\s*(?P<name>{IDENT})\s*\([^)]*\)\s*\{{"),
        ),
        (
            DeclarationKind::ObjectMethod,
            format!(r"(?P<name>{IDENT})\s*\([^)]*\)\s*\{{"),
        ),
        (
            DeclarationKind::PrivateMethod,
            format!(r"(?:\basync\s+)?(?P<name>#{IDENT})\s*\([^)]*\)\s*\{{"),
        ),
    ]
}

/// Applies the ordered declaration rules to a file.
#[derive(Debug, Clone, Copy)]
pub struct DeclarationScanner {
    rules: &'static [DeclarationRule],
}

impl DeclarationScanner {
    /// Scanner over the built-in rule list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES.as_slice(),
        }
    }

    /// Rules in application order.
    #[must_use]
    pub const fn rules(&self) -> &'static [DeclarationRule] {
        self.rules
    }

    /// Pool the matches of every rule, ordered by start offset. Matches at
    /// the same offset keep rule order.
    #[must_use]
    pub fn scan(&self, source: &SourceFile<'_>) -> Vec<DeclarationCandidate> {
        let text = source.text();
        let mut candidates: Vec<DeclarationCandidate> = self
            .rules
            .iter()
            .flat_map(|rule| {
                rule.matches(text)
                    .map(move |(name, start_offset)| DeclarationCandidate {
                        name,
                        start_offset,
                        start_line: source.line_of(start_offset),
                        kind: rule.kind(),
                    })
            })
            .collect();

        candidates.sort_by_key(|candidate| candidate.start_offset);
        candidates
    }
}

impl Default for DeclarationScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: DeclarationKind) -> &'static DeclarationRule {
        DeclarationScanner::new()
            .rules()
            .iter()
            .find(|rule| rule.kind() == kind)
            .expect("rule registered")
    }

    fn names(kind: DeclarationKind, text: &str) -> Vec<String> {
        rule(kind).matches(text).map(|(name, _)| name).collect()
    }

    #[test]
    fn every_rule_compiles() {
        assert_eq!(DeclarationScanner::new().rules().len(), 10);
    }

    #[test]
    fn function_rule_covers_modifiers_and_generators() {
        let text = "export default async function load(a) {}\nfunction* walk() {}\nfunction *spin() {}\nfunctionality(x);";
        assert_eq!(
            names(DeclarationKind::Function, text),
            vec!["load", "walk", "spin"]
        );
        let (_, offset) = rule(DeclarationKind::Function)
            .matches(text)
            .next()
            .expect("match");
        assert_eq!(offset, 0);
    }

    #[test]
    fn bound_function_rules() {
        assert_eq!(
            names(
                DeclarationKind::FunctionExpression,
                "const f = async function () {};\nlet g = function* named() {};"
            ),
            vec!["f", "g"]
        );
        assert_eq!(
            names(
                DeclarationKind::ArrowFunction,
                "export const h = async (a, b) => a + b;\nvar k = () => {};"
            ),
            vec!["h", "k"]
        );
        assert_eq!(
            names(
                DeclarationKind::BareArrowFunction,
                "const double = x => x * 2;\nconst later = async value => value;"
            ),
            vec!["double", "later"]
        );
    }

    #[test]
    fn method_rules() {
        let class = "class A {\n  static async build(cfg): Promise<A> {\n  }\n  get size() { return 1; }\n  set size(v) {}\n  *items() {}\n  #secret() {}\n  constructor(x) {}\n}";
        assert_eq!(
            names(DeclarationKind::Method, "  static async build(cfg): Promise<A> {"),
            vec!["build"]
        );
        assert_eq!(
            names(DeclarationKind::Accessor, class),
            vec!["get size", "set size"]
        );
        assert_eq!(names(DeclarationKind::GeneratorMethod, class), vec!["items"]);
        assert_eq!(names(DeclarationKind::PrivateMethod, class), vec!["#secret"]);
        assert_eq!(names(DeclarationKind::Constructor, class), vec!["constructor"]);
    }

    #[test]
    fn control_flow_keywords_are_excluded() {
        let text = "if (a) {\n} else if (b) {\n}\nfor (;;) {}\nwhile (x) {}\nswitch (y) {}\ntry {} catch (e) {}";
        assert!(names(DeclarationKind::ObjectMethod, text).is_empty());
        assert!(names(DeclarationKind::Method, text).is_empty());
    }

    #[test]
    fn await_and_return_heads_are_not_declarations() {
        let text = "async function drain(xs) {\n  for await (const x of xs) {\n    use(x);\n  }\n  return (ok) {\n}";
        for kind in [DeclarationKind::Method, DeclarationKind::ObjectMethod] {
            assert_eq!(names(kind, text), vec!["drain"], "{kind:?}");
        }
        let source = SourceFile::new("drain.js", text);
        let candidates = DeclarationScanner::new().scan(&source);
        assert!(!candidates.is_empty());
        assert!(candidates.iter().all(|candidate| candidate.name == "drain"));
    }

    #[test]
    fn scan_orders_pooled_matches_by_offset() {
        let text = "const beta = (x) => {\n  return x;\n};\nfunction alpha() {\n}\n";
        let source = SourceFile::new("a.js", text);
        let candidates = DeclarationScanner::new().scan(&source);

        let offsets: Vec<usize> = candidates.iter().map(|c| c.start_offset).collect();
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);

        assert_eq!(candidates[0].name, "beta");
        assert_eq!(candidates[0].start_line, 1);
        assert_eq!(candidates[0].kind, DeclarationKind::ArrowFunction);
        assert!(candidates
            .iter()
            .any(|c| c.name == "alpha" && c.start_line == 4 && c.kind == DeclarationKind::Function));
    }
}
