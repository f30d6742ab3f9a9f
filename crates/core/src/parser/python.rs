//! Scripting-family parser: an indentation-driven state machine
//!
//! Deliberately AST-free. The walker classifies each line, tracks a stack of
//! `(kind, indent)` frames, and closes a block at the first significant line
//! whose indent is at or below the frame's. Framework layer tagging runs as
//! rule tables keyed on the file's import set.

use super::{FileContext, ParseOutcome, SourceParser};
use crate::graph::{
    member_id, node_id, Edge, EdgeKind, Language, Layer, Node, NodeAttrs, NodeKind, Param,
};
use regex::Regex;

/// File stems recognized as entry points
const ENTRY_STEMS: &[&str] = &[
    "main",
    "app",
    "application",
    "run",
    "server",
    "manage",
    "wsgi",
    "asgi",
    "__main__",
    "cli",
];

/// What a single source line is, before indent handling
#[derive(Debug, Clone, PartialEq)]
enum LineKind {
    Blank,
    Comment,
    Decorator(String),
    ClassDef,
    FuncDef { is_async: bool },
    Import(Vec<String>),
    MainGuard,
    Assign { name: String, ctor: String },
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum FrameKind {
    Class,
    Function,
}

/// An open block: the node that introduced it and the indent of its header
struct Frame {
    kind: FrameKind,
    node_idx: usize,
    indent: usize,
}

/// Web framework selected from the import set
#[derive(Debug, Clone, Copy, PartialEq)]
enum Framework {
    AsyncWeb,
    Mvc,
    Lightweight,
    None,
}

pub struct PythonParser {
    class_re: Regex,
    def_re: Regex,
    decorator_re: Regex,
    assign_re: Regex,
    import_re: Regex,
    from_import_re: Regex,
    main_guard_re: Regex,
    endpoint_decorator_re: Regex,
    route_decorator_re: Regex,
}

impl Default for PythonParser {
    fn default() -> Self {
        Self {
            class_re: Regex::new(r"^class\s+([A-Za-z_]\w*)").unwrap(),
            def_re: Regex::new(r"^(async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap(),
            decorator_re: Regex::new(r"^@([\w.]+)").unwrap(),
            assign_re: Regex::new(r"^([A-Za-z_]\w*)\s*(?::[^=]+)?=\s*([A-Za-z_][\w.]*)\s*\(")
                .unwrap(),
            import_re: Regex::new(r"^import\s+(.+)").unwrap(),
            from_import_re: Regex::new(r"^from\s+(\.*[\w.]*)\s+import\b").unwrap(),
            main_guard_re: Regex::new(r#"^if\s+__name__\s*==\s*["']__main__["']"#).unwrap(),
            endpoint_decorator_re: Regex::new(
                r"^\w+\.(get|post|put|delete|patch|options|head)$",
            )
            .unwrap(),
            route_decorator_re: Regex::new(r"^\w+\.route$").unwrap(),
        }
    }
}

impl PythonParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn classify(&self, trimmed: &str) -> LineKind {
        if trimmed.is_empty() {
            return LineKind::Blank;
        }
        if trimmed.starts_with('#') {
            return LineKind::Comment;
        }
        if let Some(caps) = self.decorator_re.captures(trimmed) {
            return LineKind::Decorator(caps[1].to_string());
        }
        if self.class_re.is_match(trimmed) {
            return LineKind::ClassDef;
        }
        if let Some(caps) = self.def_re.captures(trimmed) {
            return LineKind::FuncDef {
                is_async: caps.get(1).is_some(),
            };
        }
        if self.main_guard_re.is_match(trimmed) {
            return LineKind::MainGuard;
        }
        if let Some(caps) = self.import_re.captures(trimmed) {
            let literals = caps[1]
                .split(',')
                .map(|part| {
                    part.trim()
                        .split_whitespace()
                        .next()
                        .unwrap_or("")
                        .to_string()
                })
                .filter(|s| !s.is_empty())
                .collect();
            return LineKind::Import(literals);
        }
        if let Some(caps) = self.from_import_re.captures(trimmed) {
            let module = caps[1].to_string();
            if !module.is_empty() {
                return LineKind::Import(vec![module]);
            }
            return LineKind::Other;
        }
        if let Some(caps) = self.assign_re.captures(trimmed) {
            return LineKind::Assign {
                name: caps[1].to_string(),
                ctor: caps[2].to_string(),
            };
        }
        LineKind::Other
    }
}

impl SourceParser for PythonParser {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extensions(&self) -> &[&str] {
        &[".py"]
    }

    fn parse(&self, source: &str, file: &FileContext) -> ParseOutcome {
        let rel = file.rel_str();
        let module_id = super::module_id_for(&file.rel_path);
        let lines: Vec<&str> = source.lines().collect();

        let mut out = ParseOutcome::default();
        let mut stack: Vec<Frame> = Vec::new();
        let mut pending_decorators: Vec<String> = Vec::new();
        let mut awaiting_docstring: Option<usize> = None; // index into out.nodes
        let mut module_docstring: Option<String> = None;
        let mut seen_significant = false;
        let mut has_main_guard = false;
        let mut app_ctor = false;
        let mut var_ctors: Vec<(usize, String)> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let raw = lines[i];
            let trimmed = raw.trim_start();
            let indent = raw.len() - trimmed.len();
            let trimmed = trimmed.trim_end();
            let kind = self.classify(trimmed);

            if matches!(kind, LineKind::Blank | LineKind::Comment) {
                i += 1;
                continue;
            }

            // A block ends at the first significant line whose indent is at
            // or below the frame's header indent.
            while stack.last().is_some_and(|f| indent <= f.indent) {
                stack.pop();
            }

            // Docstring: the first string literal that opens a block
            if trimmed.starts_with("\"\"\"") || trimmed.starts_with("'''") {
                let (docstring, consumed) = read_string_block(&lines, i);
                if !seen_significant {
                    module_docstring = Some(docstring);
                } else if let Some(node_idx) = awaiting_docstring.take() {
                    out.nodes[node_idx].attrs.docstring = Some(docstring);
                }
                seen_significant = true;
                i += consumed;
                continue;
            }
            seen_significant = true;
            awaiting_docstring = None;

            match kind {
                LineKind::Decorator(name) => {
                    pending_decorators.push(name);
                    // Decorator arguments may span lines; skip until the
                    // brackets opened on this line are balanced again.
                    let mut depth = line_depth_delta(lines[i]);
                    i += 1;
                    while depth > 0 && i < lines.len() {
                        depth += line_depth_delta(lines[i]);
                        i += 1;
                    }
                }
                LineKind::ClassDef => {
                    let (header, consumed) = join_header(&lines, i);
                    let (name, bases) = parse_class_header(&header);
                    let line_no = i + 1;

                    let id = match stack.last() {
                        Some(frame) => member_id(
                            &out.nodes[frame.node_idx].id,
                            NodeKind::Class,
                            &name,
                            None,
                        ),
                        None => node_id(&rel, NodeKind::Class, &name, None),
                    };
                    let attrs = NodeAttrs {
                        decorators: std::mem::take(&mut pending_decorators),
                        base_classes: bases,
                        ..Default::default()
                    };
                    let mut class_node = Node::new(
                        id.clone(),
                        name,
                        NodeKind::Class,
                        Language::Python,
                        rel.clone(),
                        line_no,
                    )
                    .with_attrs(attrs);
                    if let Some(frame) = stack.last() {
                        let parent_id = out.nodes[frame.node_idx].id.clone();
                        class_node.parent = Some(parent_id.clone());
                        out.edges
                            .push(Edge::new(parent_id, id.clone(), EdgeKind::Contains));
                    }
                    out.nodes.push(class_node);
                    let node_idx = out.nodes.len() - 1;
                    stack.push(Frame {
                        kind: FrameKind::Class,
                        node_idx,
                        indent,
                    });
                    awaiting_docstring = Some(node_idx);
                    i += consumed;
                }
                LineKind::FuncDef { is_async } => {
                    let (header, consumed) = join_header(&lines, i);
                    let Some((name, params, return_type)) = parse_def_header(&header) else {
                        i += consumed;
                        continue;
                    };
                    let line_no = i + 1;

                    let in_class = stack
                        .last()
                        .is_some_and(|f| f.kind == FrameKind::Class);
                    let kind = if in_class {
                        NodeKind::Method
                    } else {
                        NodeKind::Function
                    };
                    let id = match stack.last() {
                        Some(frame) => {
                            member_id(&out.nodes[frame.node_idx].id, kind, &name, Some(line_no))
                        }
                        None => node_id(&rel, kind, &name, Some(line_no)),
                    };
                    let attrs = NodeAttrs {
                        parameters: params,
                        return_type,
                        is_async,
                        decorators: std::mem::take(&mut pending_decorators),
                        ..Default::default()
                    };
                    let mut fn_node = Node::new(
                        id.clone(),
                        name,
                        kind,
                        Language::Python,
                        rel.clone(),
                        line_no,
                    )
                    .with_attrs(attrs);
                    if let Some(frame) = stack.last() {
                        let parent_id = out.nodes[frame.node_idx].id.clone();
                        fn_node.parent = Some(parent_id.clone());
                        out.edges
                            .push(Edge::new(parent_id, id.clone(), EdgeKind::Contains));
                    }
                    out.nodes.push(fn_node);
                    let node_idx = out.nodes.len() - 1;
                    stack.push(Frame {
                        kind: FrameKind::Function,
                        node_idx,
                        indent,
                    });
                    awaiting_docstring = Some(node_idx);
                    i += consumed;
                }
                LineKind::Import(literals) => {
                    pending_decorators.clear();
                    for literal in literals {
                        let import_id = node_id(&rel, NodeKind::Import, &literal, None);
                        if !out.nodes.iter().any(|n| n.id == import_id) {
                            let import_node = Node::new(
                                import_id.clone(),
                                literal.clone(),
                                NodeKind::Import,
                                Language::Python,
                                rel.clone(),
                                i + 1,
                            )
                            .with_parent(&module_id);
                            out.edges.push(Edge::new(
                                module_id.clone(),
                                import_id,
                                EdgeKind::Contains,
                            ));
                            out.nodes.push(import_node);
                        }
                        out.import_literals.push(literal);
                    }
                    i += 1;
                }
                LineKind::MainGuard => {
                    pending_decorators.clear();
                    if indent == 0 {
                        has_main_guard = true;
                    }
                    i += 1;
                }
                LineKind::Assign { name, ctor } if stack.is_empty() && indent == 0 => {
                    pending_decorators.clear();
                    let id = node_id(&rel, NodeKind::Field, &name, None);
                    if !out.nodes.iter().any(|n| n.id == id) {
                        let field_node = Node::new(
                            id,
                            name,
                            NodeKind::Field,
                            Language::Python,
                            rel.clone(),
                            i + 1,
                        );
                        out.nodes.push(field_node);
                        var_ctors.push((out.nodes.len() - 1, ctor.clone()));
                    }
                    if matches!(ctor.as_str(), "FastAPI" | "Flask") {
                        app_ctor = true;
                    }
                    i += 1;
                }
                _ => {
                    pending_decorators.clear();
                    i += 1;
                }
            }
        }

        // ── Layer rule tables, keyed on the detected framework ───────────
        let framework = detect_framework(&out.import_literals);
        self.apply_layers(&mut out, framework, &var_ctors);

        // Uses edge: decorated endpoint → the module-scope object it hangs off
        let mut uses = Vec::new();
        for node in out
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Function | NodeKind::Method))
        {
            for decorator in &node.attrs.decorators {
                let Some(receiver) = decorator.split('.').next() else {
                    continue;
                };
                if receiver == decorator.as_str() {
                    continue;
                }
                if let Some(target) = out
                    .nodes
                    .iter()
                    .find(|n| n.kind == NodeKind::Field && n.label == receiver)
                {
                    uses.push(Edge::new(node.id.clone(), target.id.clone(), EdgeKind::Uses));
                }
            }
        }
        out.edges.extend(uses);

        // ── Module node with entry flags ─────────────────────────────────
        let stem = file.stem();
        let is_entry = ENTRY_STEMS.contains(&stem.as_str())
            || has_main_guard
            || app_ctor
            || file.is_entry_hint;

        let mut module = Node::new(
            module_id,
            stem,
            NodeKind::Module,
            Language::Python,
            rel,
            1,
        )
        .with_end_line(lines.len().max(1));
        module.attrs.docstring = module_docstring;
        module.is_entry = is_entry;
        if app_ctor {
            module.layer = Some(Layer::App);
        }
        module.is_primary_entry = app_ctor || has_main_guard;
        out.nodes.push(module);

        out
    }
}

impl PythonParser {
    fn apply_layers(
        &self,
        out: &mut ParseOutcome,
        framework: Framework,
        var_ctors: &[(usize, String)],
    ) {
        // Constructor expressions on module-scope variables
        for (idx, ctor) in var_ctors {
            let layer = match (framework, ctor.as_str()) {
                (_, "FastAPI") => Some(Layer::App),
                (_, "APIRouter") => Some(Layer::Router),
                (_, "Flask") => Some(Layer::App),
                (_, "Blueprint") => Some(Layer::Blueprint),
                _ => None,
            };
            if let Some(layer) = layer {
                out.nodes[*idx].layer = Some(layer);
            }
        }

        // Only top-level entities carry layer tags
        for node in &mut out.nodes {
            if node.layer.is_some() || node.parent.is_some() {
                continue;
            }
            let layer = match framework {
                Framework::AsyncWeb => self.async_web_layer(node),
                Framework::Mvc => mvc_layer(node),
                Framework::Lightweight => self.lightweight_layer(node),
                Framework::None => None,
            };
            if let Some(layer) = layer.or_else(|| self.generic_layer(node)) {
                node.layer = Some(layer);
            }
        }
    }

    fn async_web_layer(&self, node: &Node) -> Option<Layer> {
        match node.kind {
            NodeKind::Function => {
                let endpoint = node
                    .attrs
                    .decorators
                    .iter()
                    .any(|d| self.endpoint_decorator_re.is_match(d));
                endpoint.then_some(Layer::Endpoint)
            }
            NodeKind::Class => {
                if node.attrs.base_classes.iter().any(|b| b == "BaseModel") {
                    Some(Layer::Schema)
                } else if node.attrs.base_classes.iter().any(|b| base_is_model(b)) {
                    Some(Layer::Model)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn lightweight_layer(&self, node: &Node) -> Option<Layer> {
        match node.kind {
            NodeKind::Function => {
                let route = node
                    .attrs
                    .decorators
                    .iter()
                    .any(|d| self.route_decorator_re.is_match(d));
                route.then_some(Layer::Route)
            }
            NodeKind::Class => {
                if node.attrs.base_classes.iter().any(|b| b.ends_with("MethodView")) {
                    Some(Layer::View)
                } else if node.attrs.base_classes.iter().any(|b| base_is_model(b)) {
                    Some(Layer::Model)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn generic_layer(&self, node: &Node) -> Option<Layer> {
        if node.label.starts_with("test_") || node.label.starts_with("Test") {
            return Some(Layer::Test);
        }
        if matches!(node.kind, NodeKind::Function) {
            let endpoint = node.attrs.decorators.iter().any(|d| {
                matches!(
                    d.as_str(),
                    "get" | "post" | "put" | "delete" | "patch" | "route"
                ) || self.endpoint_decorator_re.is_match(d)
                    || self.route_decorator_re.is_match(d)
            });
            if endpoint {
                return Some(Layer::Endpoint);
            }
        }
        if node.kind == NodeKind::Class && node.attrs.base_classes.iter().any(|b| base_is_model(b))
        {
            return Some(Layer::Model);
        }
        let lower = node.label.to_lowercase();
        if lower.contains("controller") {
            return Some(Layer::Controller);
        }
        if lower.contains("repository") {
            return Some(Layer::Repository);
        }
        if lower.contains("service") {
            return Some(Layer::Service);
        }
        None
    }
}

// ── Line assembly helpers ────────────────────────────────────────────────

/// Join a class/def header that may span lines until bracket depth returns
/// to zero and a trailing colon is seen. Returns (header, lines consumed).
fn join_header(lines: &[&str], start: usize) -> (String, usize) {
    let mut header = String::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;

    for (offset, raw) in lines[start..].iter().enumerate() {
        let line = raw.trim_end();
        if !header.is_empty() {
            header.push(' ');
        }
        header.push_str(line.trim_start());

        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match in_string {
                Some(q) => {
                    if c == '\\' {
                        chars.next();
                    } else if c == q {
                        in_string = None;
                    }
                }
                None => match c {
                    '\'' | '"' => in_string = Some(c),
                    '(' | '[' | '{' => depth += 1,
                    ')' | ']' | '}' => depth -= 1,
                    '#' => break,
                    _ => {}
                },
            }
        }

        if depth <= 0 && in_string.is_none() && header.trim_end().ends_with(':') {
            return (header, offset + 1);
        }
        // Unterminated header: give up after a screenful
        if offset > 40 {
            break;
        }
    }
    (header, 1)
}

/// `class Name(Base, Other):` → (name, bases)
fn parse_class_header(header: &str) -> (String, Vec<String>) {
    let after = header.trim_start_matches("class").trim_start();
    let name: String = after
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();

    let mut bases = Vec::new();
    if let (Some(open), Some(close)) = (after.find('('), after.rfind(')')) {
        if close > open {
            for part in split_top_level(&after[open + 1..close]) {
                let part = part.trim();
                // keyword arguments like metaclass=… are not bases
                if part.is_empty() || part.contains('=') || part == "*" {
                    continue;
                }
                bases.push(part.to_string());
            }
        }
    }
    (name, bases)
}

/// `def name(params) -> R:` → (name, params, return type)
fn parse_def_header(header: &str) -> Option<(String, Vec<Param>, Option<String>)> {
    let after = header
        .trim_start_matches("async")
        .trim_start()
        .strip_prefix("def")?
        .trim_start();
    let name: String = after
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if name.is_empty() {
        return None;
    }

    let open = after.find('(')?;
    let close = matching_paren(after, open)?;
    let params = parse_params(&after[open + 1..close]);

    let tail = &after[close + 1..];
    let return_type = tail
        .find("->")
        .map(|arrow| tail[arrow + 2..].trim().trim_end_matches(':').trim().to_string())
        .filter(|t| !t.is_empty());

    Some((name, params, return_type))
}

/// Parameter grammar: `name`, `name: T`, `name = d`, `name: T = d`;
/// `self`, `cls`, `*args`, `**kwargs`, and bare markers are skipped.
fn parse_params(raw: &str) -> Vec<Param> {
    let mut out = Vec::new();
    for part in split_top_level(raw) {
        let part = part.trim();
        if part.is_empty()
            || part == "/"
            || part.starts_with('*')
            || part == "self"
            || part.starts_with("self:")
            || part == "cls"
        {
            continue;
        }

        let (head, default) = match split_once_top_level(part, '=') {
            Some((h, d)) => (h.trim(), Some(d.trim().to_string())),
            None => (part, None),
        };
        let (name, param_type) = match head.split_once(':') {
            Some((n, t)) => (n.trim(), Some(t.trim().to_string())),
            None => (head, None),
        };
        if name.is_empty() {
            continue;
        }
        out.push(Param {
            name: name.to_string(),
            param_type: param_type.filter(|t| !t.is_empty()),
            optional: default.is_some(),
            default,
        });
    }
    out
}

/// Split on commas that are not inside brackets or strings
fn split_top_level(raw: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;

    for c in raw.chars() {
        match in_string {
            Some(q) => {
                current.push(c);
                if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    in_string = Some(c);
                    current.push(c);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(std::mem::take(&mut current));
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts
}

fn split_once_top_level(raw: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    for (i, c) in raw.char_indices() {
        match in_string {
            Some(q) => {
                if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                c if c == sep && depth == 0 => {
                    return Some((&raw[..i], &raw[i + 1..]));
                }
                _ => {}
            },
        }
    }
    None
}

/// Net bracket depth change of one line, ignoring strings and comments
fn line_depth_delta(line: &str) -> i32 {
    let mut depth = 0;
    let mut in_string: Option<char> = None;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match in_string {
            Some(q) => {
                if c == '\\' {
                    chars.next();
                } else if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                '#' => break,
                _ => {}
            },
        }
    }
    depth
}

fn matching_paren(s: &str, open: usize) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    for (i, c) in s.char_indices().skip(open) {
        match in_string {
            Some(q) => {
                if c == q {
                    in_string = None;
                }
            }
            None => match c {
                '\'' | '"' => in_string = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}

/// Read a triple-quoted string starting at `lines[start]`.
/// Returns (content, lines consumed).
fn read_string_block(lines: &[&str], start: usize) -> (String, usize) {
    let first = lines[start].trim();
    let quote = if first.starts_with("\"\"\"") { "\"\"\"" } else { "'''" };
    let body = &first[3..];

    // Single-line docstring
    if let Some(end) = body.find(quote) {
        return (body[..end].trim().to_string(), 1);
    }

    let mut content = vec![body.trim().to_string()];
    for (offset, raw) in lines[start + 1..].iter().enumerate() {
        if let Some(end) = raw.find(quote) {
            let last = raw[..end].trim();
            if !last.is_empty() {
                content.push(last.to_string());
            }
            let text = content.join("\n").trim().to_string();
            return (text, offset + 2);
        }
        content.push(raw.trim().to_string());
    }
    (content.join("\n").trim().to_string(), lines.len() - start)
}

// ── Framework selection ──────────────────────────────────────────────────

fn detect_framework(imports: &[String]) -> Framework {
    let has = |prefix: &str| {
        imports
            .iter()
            .any(|i| i == prefix || i.starts_with(&format!("{}.", prefix)))
    };
    if has("fastapi") {
        Framework::AsyncWeb
    } else if has("django") || has("rest_framework") {
        Framework::Mvc
    } else if has("flask") {
        Framework::Lightweight
    } else {
        Framework::None
    }
}

fn base_is_model(base: &str) -> bool {
    let last = base.rsplit('.').next().unwrap_or(base);
    last == "Model" || last.ends_with("Model") && last != "BaseModel" || base == "Base"
}

/// MVC-style rules match primarily by base class
fn mvc_layer(node: &Node) -> Option<Layer> {
    if node.kind != NodeKind::Class {
        return None;
    }
    for base in &node.attrs.base_classes {
        let last = base.rsplit('.').next().unwrap_or(base);
        let layer = if last.ends_with("ViewSet") {
            Some(Layer::Viewset)
        } else if last.ends_with("Serializer") {
            Some(Layer::Serializer)
        } else if last == "Model" || base == "models.Model" {
            Some(Layer::Model)
        } else if last.ends_with("ModelAdmin") || base.starts_with("admin.") {
            Some(Layer::Admin)
        } else if last.ends_with("Form") {
            Some(Layer::Form)
        } else if last.contains("Middleware") {
            Some(Layer::Middleware)
        } else if last == "BaseCommand" {
            Some(Layer::Command)
        } else if last.ends_with("TestCase") {
            Some(Layer::Test)
        } else if last.ends_with("View") {
            Some(Layer::View)
        } else {
            None
        };
        if layer.is_some() {
            return layer;
        }
    }
    None
}
