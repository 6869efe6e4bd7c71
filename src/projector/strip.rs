//! Erases static type syntax from TypeScript source.
//!
//! The source is parsed with tree-sitter and never re-printed: the stripper
//! records byte ranges to delete (plus the odd replacement for module
//! specifiers) and applies them to the original text, so everything it does
//! not touch keeps its exact formatting.

use tree_sitter::{Node, Parser};

/// Statements with no runtime meaning. They disappear with their line.
const ERASED_DECLARATIONS: [&str; 4] =
    ["interface_declaration", "type_alias_declaration", "ambient_declaration", "function_signature"];

/// Class members with no runtime meaning.
const ERASED_MEMBERS: [&str; 3] = ["method_signature", "abstract_method_signature", "index_signature"];

/// Type positions removed as a whole.
const TYPE_NODES: [&str; 5] =
    ["type_annotation", "type_predicate_annotation", "asserts_annotation", "type_parameters", "type_arguments"];

/// A source position the stripper gave up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripError {
    pub line: usize,
    pub reason: String,
}

impl StripError {
    pub fn new<S: Into<String>>(line: usize, reason: S) -> Self {
        Self { line, reason: reason.into() }
    }
}

/// Returns `source` with all erasable type syntax removed.
///
/// # Errors
/// Constructs with runtime semantics (`enum`, `namespace`, constructor
/// parameter properties) and input that does not parse.
pub fn strip_types(source: &str) -> Result<String, StripError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|e| StripError::new(0, format!("cannot load the TypeScript grammar: {e}")))?;
    let tree = parser.parse(source, None).ok_or_else(|| StripError::new(0, "the parser gave up"))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map_or(1, line_of);
        return Err(StripError::new(line, "not valid TypeScript"));
    }

    let mut stripper = Stripper { source, edits: Vec::new() };
    stripper.visit(root)?;
    Ok(stripper.apply())
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn first_error<'t>(node: Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    children(node).into_iter().filter(|child| child.has_error()).find_map(first_error)
}

/// Whether `node` has the keyword `token` as a direct child.
fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node).iter().any(|child| !child.is_named() && child.kind() == token)
}

fn is_erased_declaration(node: Node<'_>) -> bool {
    ERASED_DECLARATIONS.contains(&node.kind())
}

/// `constructor(private repo: Repo)` declares a field as a side effect.
fn is_parameter_property(node: Node<'_>) -> bool {
    children(node).iter().any(|child| {
        matches!(child.kind(), "accessibility_modifier" | "override_modifier")
            || (!child.is_named() && child.kind() == "readonly")
    })
}

#[derive(Debug)]
struct Edit {
    start: usize,
    end: usize,
    replacement: Option<String>,
}

struct Stripper<'s> {
    source: &'s str,
    edits: Vec<Edit>,
}

impl Stripper<'_> {
    fn visit(&mut self, node: Node<'_>) -> Result<(), StripError> {
        let kind = node.kind();
        match kind {
            "enum_declaration" => Err(StripError::new(line_of(node), "enum declarations have runtime semantics")),
            "internal_module" | "module" if node.is_named() => {
                Err(StripError::new(line_of(node), "namespaces have runtime semantics"))
            }
            "required_parameter" | "optional_parameter" if is_parameter_property(node) => Err(StripError::new(
                line_of(node),
                "constructor parameter properties have runtime semantics",
            )),
            _ if is_erased_declaration(node) || ERASED_MEMBERS.contains(&kind) => {
                self.remove_statement(node);
                Ok(())
            }
            "public_field_definition" if has_token(node, "declare") || has_token(node, "abstract") => {
                self.remove_statement(node);
                Ok(())
            }
            _ if TYPE_NODES.contains(&kind) => {
                self.remove(node.start_byte(), node.end_byte());
                Ok(())
            }
            "implements_clause" => {
                self.remove(self.skip_blanks_back(node.start_byte()), node.end_byte());
                Ok(())
            }
            "accessibility_modifier" | "override_modifier" => {
                self.remove_word(node);
                Ok(())
            }
            "as_expression" | "satisfies_expression" => match node.named_child(0) {
                Some(expression) => {
                    self.remove(expression.end_byte(), node.end_byte());
                    self.visit(expression)
                }
                None => Ok(()),
            },
            "non_null_expression" => {
                if let Some(bang) = children(node).last().filter(|last| last.kind() == "!") {
                    self.remove(bang.start_byte(), bang.end_byte());
                }
                self.visit_children(node)
            }
            "type_assertion" => {
                // `<T>expr`
                let parts = children(node);
                match (parts.first(), parts.last()) {
                    (Some(types), Some(expression)) if types.kind() == "type_arguments" => {
                        self.remove(types.start_byte(), expression.start_byte());
                        self.visit(*expression)
                    }
                    _ => self.visit_children(node),
                }
            }
            "import_statement" => {
                self.import_statement(node);
                Ok(())
            }
            "export_statement" => self.export_statement(node),
            "call_expression" => {
                // import('./module.ts')
                if node.child_by_field_name("function").is_some_and(|f| f.kind() == "import") {
                    if let Some(specifier) = node.child_by_field_name("arguments").and_then(|a| a.named_child(0)) {
                        self.rewrite_specifier(specifier);
                    }
                }
                self.visit_children(node)
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'_>) -> Result<(), StripError> {
        for child in children(node) {
            if child.is_named() {
                self.visit(child)?;
            } else {
                self.erase_marker(node.kind(), child);
            }
        }
        Ok(())
    }

    /// Optional and definite markers, and modifier keywords JavaScript lacks.
    fn erase_marker(&mut self, parent: &str, token: Node<'_>) {
        match (parent, token.kind()) {
            ("optional_parameter" | "public_field_definition" | "method_definition", "?")
            | ("public_field_definition" | "variable_declarator", "!") => {
                self.remove(token.start_byte(), token.end_byte());
            }
            ("public_field_definition", "readonly") | ("abstract_class_declaration", "abstract") => {
                self.remove_word(token);
            }
            _ => {}
        }
    }

    fn import_statement(&mut self, node: Node<'_>) {
        if has_token(node, "type") {
            self.remove_statement(node);
            return;
        }
        let clause = children(node).into_iter().find(|child| child.kind() == "import_clause");
        if let Some(clause) = clause {
            let named = children(clause).into_iter().find(|child| child.kind() == "named_imports");
            if let Some(named) = named {
                if self.remove_type_specifiers(named, "import_specifier") {
                    // import express, { type Request } from 'express'
                    match named.prev_named_sibling() {
                        Some(default) => self.remove(default.end_byte(), named.end_byte()),
                        None => {
                            self.remove_statement(node);
                            return;
                        }
                    }
                }
            }
        }
        if let Some(source) = node.child_by_field_name("source") {
            self.rewrite_specifier(source);
        }
    }

    fn export_statement(&mut self, node: Node<'_>) -> Result<(), StripError> {
        let erased = node.child_by_field_name("declaration").is_some_and(is_erased_declaration);
        if erased || has_token(node, "type") {
            self.remove_statement(node);
            return Ok(());
        }
        let clause = children(node).into_iter().find(|child| child.kind() == "export_clause");
        if let Some(clause) = clause {
            if self.remove_type_specifiers(clause, "export_specifier") {
                self.remove_statement(node);
                return Ok(());
            }
        }
        if let Some(source) = node.child_by_field_name("source") {
            self.rewrite_specifier(source);
        }
        self.visit_children(node)
    }

    /// Removes `type` specifiers from an import or export list. Returns true
    /// when the list had specifiers and all of them were type-only.
    fn remove_type_specifiers(&mut self, list: Node<'_>, specifier_kind: &str) -> bool {
        let specifiers: Vec<Node<'_>> =
            children(list).into_iter().filter(|child| child.kind() == specifier_kind).collect();
        let typed: Vec<Node<'_>> = specifiers.iter().copied().filter(|s| has_token(*s, "type")).collect();
        if !specifiers.is_empty() && typed.len() == specifiers.len() {
            return true;
        }
        for specifier in typed {
            self.remove_specifier(specifier);
        }
        false
    }

    /// Removes a list entry together with one adjacent comma.
    fn remove_specifier(&mut self, specifier: Node<'_>) {
        match specifier.next_sibling() {
            Some(comma) if comma.kind() == "," => {
                let end = comma.next_sibling().map_or(comma.end_byte(), |next| next.start_byte());
                self.remove(specifier.start_byte(), end);
            }
            _ => {
                let start = specifier
                    .prev_sibling()
                    .filter(|prev| prev.kind() == ",")
                    .and_then(|comma| comma.prev_sibling())
                    .map_or(specifier.start_byte(), |prev| prev.end_byte());
                self.remove(start, specifier.end_byte());
            }
        }
    }

    // Edits.

    fn remove(&mut self, start: usize, end: usize) {
        if start < end {
            self.edits.push(Edit { start, end, replacement: None });
        }
    }

    fn skip_blanks_back(&self, mut pos: usize) -> usize {
        let bytes = self.source.as_bytes();
        while pos > 0 && matches!(bytes[pos - 1], b' ' | b'\t') {
            pos -= 1;
        }
        pos
    }

    fn skip_blanks(&self, mut pos: usize) -> usize {
        let bytes = self.source.as_bytes();
        while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t') {
            pos += 1;
        }
        pos
    }

    /// Removes a node together with the blanks after it.
    fn remove_word(&mut self, node: Node<'_>) {
        let end = self.skip_blanks(node.end_byte());
        self.remove(node.start_byte(), end);
    }

    /// Removes a statement or class member and its trailing `;`. One alone
    /// on its lines takes the lines with it.
    fn remove_statement(&mut self, node: Node<'_>) {
        let source = self.source;
        let mut start = node.start_byte();
        let mut stop = node.end_byte();
        let after_blanks = self.skip_blanks(stop);
        if source[after_blanks..].starts_with(';') {
            stop = after_blanks + 1;
        }

        let line_start = source[..start].rfind('\n').map_or(0, |n| n + 1);
        let rest = &source[stop..];
        let line_end = rest.find('\n');
        let tail = &rest[..line_end.unwrap_or(rest.len())];
        if source[line_start..start].trim().is_empty() && tail.trim().is_empty() {
            start = line_start;
            stop += line_end.map_or(rest.len(), |n| n + 1);
            // Drop one of two blank lines the removal would leave adjacent.
            let preceded_by_blank = start == 0 || source[..start].ends_with("\n\n") || source[..start].ends_with("\n\r\n");
            let after = &source[stop..];
            if preceded_by_blank {
                if let Some(n) = after.find('\n') {
                    if after[..n].trim().is_empty() {
                        stop += n + 1;
                    }
                }
            }
        }
        self.remove(start, stop);
    }

    /// Rewrites a relative `.ts` module specifier to `.js`.
    fn rewrite_specifier(&mut self, string: Node<'_>) {
        if string.kind() != "string" {
            return;
        }
        let text = &self.source[string.start_byte()..string.end_byte()];
        if text.len() < 2 {
            return;
        }
        let quote = &text[..1];
        let path = &text[1..text.len() - 1];
        let relative = path.starts_with("./") || path.starts_with("../");
        if relative && path.ends_with(".ts") && !path.ends_with(".d.ts") {
            let replacement = format!("{quote}{}.js{quote}", &path[..path.len() - 3]);
            self.edits.push(Edit { start: string.start_byte(), end: string.end_byte(), replacement: Some(replacement) });
        }
    }

    fn apply(mut self) -> String {
        self.edits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut merged: Vec<Edit> = Vec::with_capacity(self.edits.len());
        for edit in self.edits {
            match merged.last_mut() {
                Some(last) if edit.start < last.end => {
                    if last.replacement.is_none() && edit.replacement.is_none() {
                        last.end = last.end.max(edit.end);
                    }
                }
                _ => merged.push(edit),
            }
        }

        let mut out = String::with_capacity(self.source.len());
        let mut cursor = 0;
        for edit in merged {
            out.push_str(&self.source[cursor..edit.start]);
            if let Some(replacement) = &edit.replacement {
                out.push_str(replacement);
            }
            cursor = edit.end;
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}
