use crate::ast::{
    AnchorDecl, DetectorDecl, DetectorKind, GeneratorDecl, GeneratorDeclKind, MassDecl,
    ParticleDecl, Scene, SimulateDecl, StepMode,
};
use crate::diagnostics::Span;
use glam::Vec2;
use thiserror::Error;

/// Parse error with optional span information
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("{message}")]
    SyntaxError {
        message: String,
        span: Option<Span>,
    },
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Option<Span>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: None,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxError { span, .. } => *span,
        }
    }
}

/// Byte offsets of line starts, for spans
struct ParseContext {
    line_offsets: Vec<usize>,
    len: usize,
}

impl ParseContext {
    fn new(source: &str) -> Self {
        let mut line_offsets = vec![0];
        for (idx, ch) in source.char_indices() {
            if ch == '\n' {
                line_offsets.push(idx + 1);
            }
        }
        Self {
            line_offsets,
            len: source.len(),
        }
    }

    fn line_start(&self, line: usize) -> usize {
        self.line_offsets.get(line).copied().unwrap_or(self.len)
    }

    fn full_line_span(&self, line: usize) -> Span {
        Span::new(self.line_start(line), self.line_start(line + 1))
    }
}

/// Parse a scene from source
pub fn parse_scene(source: &str) -> Result<Scene, ParseError> {
    let ctx = ParseContext::new(source);
    let mut particles = Vec::new();
    let mut generators = Vec::new();
    let mut simulate: Option<SimulateDecl> = None;
    let mut detectors = Vec::new();

    for (i, raw) in source.lines().enumerate() {
        let line = raw.trim();
        let span = Some(ctx.full_line_span(i));

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = Tokens::new(line, span);
        let keyword = tokens.next_required("keyword")?;
        match keyword {
            "particle" => particles.push(parse_particle(&mut tokens)?),
            "spring" | "attractor" | "constant" => {
                generators.push(parse_generator(keyword, &mut tokens)?)
            }
            "simulate" => {
                if simulate.is_some() {
                    return Err(ParseError::new("Duplicate 'simulate' declaration", span));
                }
                simulate = Some(parse_simulate(&mut tokens)?);
            }
            "detect" => detectors.push(parse_detector(&mut tokens)?),
            other => {
                return Err(ParseError::new(format!("Unexpected token: {}", other), span));
            }
        }
    }

    let simulate =
        simulate.ok_or_else(|| ParseError::message("Missing 'simulate' declaration"))?;

    Ok(Scene {
        particles,
        generators,
        simulate,
        detectors,
    })
}

/// Whitespace-separated tokens of one line; parenthesised groups stay whole.
struct Tokens<'a> {
    line: &'a str,
    items: Vec<&'a str>,
    pos: usize,
    span: Option<Span>,
}

impl<'a> Tokens<'a> {
    fn new(line: &'a str, span: Option<Span>) -> Self {
        let mut items = Vec::new();
        let mut depth = 0usize;
        let mut start: Option<usize> = None;
        for (idx, ch) in line.char_indices() {
            match ch {
                '(' => {
                    depth += 1;
                    start.get_or_insert(idx);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    start.get_or_insert(idx);
                }
                c if c.is_whitespace() && depth == 0 => {
                    if let Some(s) = start.take() {
                        items.push(&line[s..idx]);
                    }
                }
                _ => {
                    start.get_or_insert(idx);
                }
            }
        }
        if let Some(s) = start {
            items.push(&line[s..]);
        }
        Self {
            line,
            items,
            pos: 0,
            span,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(format!("{}: {}", message.into(), self.line), self.span)
    }

    fn peek(&self) -> Option<&'a str> {
        self.items.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    fn next_required(&mut self, what: &str) -> Result<&'a str, ParseError> {
        self.next()
            .ok_or_else(|| self.error(format!("Expected {}", what)))
    }

    fn expect(&mut self, keyword: &str) -> Result<(), ParseError> {
        match self.next() {
            Some(token) if token == keyword => Ok(()),
            Some(token) => Err(self.error(format!("Expected '{}', found '{}'", keyword, token))),
            None => Err(self.error(format!("Expected '{}'", keyword))),
        }
    }

    /// Skip an optional `=` between a key and its value.
    fn skip_equals(&mut self) {
        if self.peek() == Some("=") {
            self.pos += 1;
        }
    }

    fn identifier(&mut self, what: &str) -> Result<String, ParseError> {
        let token = self.next_required(what)?;
        if !is_valid_identifier(token) {
            return Err(self.error(format!("Invalid {} '{}'", what, token)));
        }
        Ok(token.to_string())
    }

    fn float(&mut self, what: &str) -> Result<f32, ParseError> {
        let token = self.next_required(what)?;
        parse_float(token).ok_or_else(|| self.error(format!("Invalid number '{}' for {}", token, what)))
    }

    fn vec2(&mut self, what: &str) -> Result<Vec2, ParseError> {
        let token = self.next_required(what)?;
        parse_vec2(token).ok_or_else(|| self.error(format!("Expected (x, y) for {}, found '{}'", what, token)))
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.peek() {
            Some(token) => Err(self.error(format!("Unexpected trailing token '{}'", token))),
            None => Ok(()),
        }
    }
}

/// `particle name at (x, y) [velocity (x, y)] [damping d] [mass m | inverse_mass im] [gravity (x, y)]`
fn parse_particle(tokens: &mut Tokens) -> Result<ParticleDecl, ParseError> {
    let name = tokens.identifier("particle name")?;
    tokens.expect("at")?;
    let position = tokens.vec2("position")?;

    let mut decl = ParticleDecl {
        name,
        position,
        velocity: Vec2::ZERO,
        damping: 1.0,
        mass: MassDecl::InverseMass(1.0),
        gravity: Vec2::ZERO,
        span: tokens.span,
    };

    while let Some(option) = tokens.next() {
        tokens.skip_equals();
        match option {
            "velocity" => decl.velocity = tokens.vec2("velocity")?,
            "gravity" => decl.gravity = tokens.vec2("gravity")?,
            "damping" => decl.damping = tokens.float("damping")?,
            "mass" => decl.mass = MassDecl::Mass(tokens.float("mass")?),
            "inverse_mass" => decl.mass = MassDecl::InverseMass(tokens.float("inverse_mass")?),
            other => {
                return Err(tokens.error(format!("Unknown particle option '{}'", other)));
            }
        }
    }

    Ok(decl)
}

/// `spring a -> b|(x, y) k = f rest = f [disabled]`
/// `attractor a -> b|(x, y) power = f [disabled]`
/// `constant a force (x, y) [disabled]`
fn parse_generator(keyword: &str, tokens: &mut Tokens) -> Result<GeneratorDecl, ParseError> {
    let owner = tokens.identifier("particle name")?;

    let kind = match keyword {
        "spring" => {
            tokens.expect("->")?;
            let anchor = parse_anchor(tokens)?;
            let mut k = None;
            let mut rest = None;
            while let Some(key) = tokens.peek() {
                match key {
                    "k" => {
                        tokens.next();
                        tokens.skip_equals();
                        k = Some(tokens.float("k")?);
                    }
                    "rest" => {
                        tokens.next();
                        tokens.skip_equals();
                        rest = Some(tokens.float("rest")?);
                    }
                    _ => break,
                }
            }
            GeneratorDeclKind::Spring {
                anchor,
                k: k.ok_or_else(|| tokens.error("Expected 'k =' in spring"))?,
                rest: rest.ok_or_else(|| tokens.error("Expected 'rest =' in spring"))?,
            }
        }
        "attractor" => {
            tokens.expect("->")?;
            let target = parse_anchor(tokens)?;
            tokens.expect("power")?;
            tokens.skip_equals();
            let power = tokens.float("power")?;
            GeneratorDeclKind::Attractor { target, power }
        }
        _ => {
            tokens.expect("force")?;
            let force = tokens.vec2("force")?;
            GeneratorDeclKind::Constant { force }
        }
    };

    let enabled = match tokens.peek() {
        Some("disabled") => {
            tokens.next();
            false
        }
        Some("enabled") => {
            tokens.next();
            true
        }
        _ => true,
    };
    tokens.finish()?;

    Ok(GeneratorDecl {
        owner,
        kind,
        enabled,
        span: tokens.span,
    })
}

fn parse_anchor(tokens: &mut Tokens) -> Result<AnchorDecl, ParseError> {
    match tokens.peek() {
        Some(token) if token.starts_with('(') => Ok(AnchorDecl::Point(tokens.vec2("anchor")?)),
        Some(_) => Ok(AnchorDecl::Particle(tokens.identifier("anchor particle")?)),
        None => Err(tokens.error("Expected anchor particle or (x, y)")),
    }
}

/// `simulate dt = x steps = n [mode = batch|sequential]`
fn parse_simulate(tokens: &mut Tokens) -> Result<SimulateDecl, ParseError> {
    tokens.expect("dt")?;
    tokens.skip_equals();
    let dt = tokens.float("dt")?;

    tokens.expect("steps")?;
    tokens.skip_equals();
    let steps_token = tokens.next_required("steps")?;
    let steps = steps_token
        .parse::<usize>()
        .map_err(|_| tokens.error(format!("Invalid step count '{}'", steps_token)))?;

    let mut mode = StepMode::Batch;
    if tokens.peek() == Some("mode") {
        tokens.next();
        tokens.skip_equals();
        mode = match tokens.next_required("mode")? {
            "batch" => StepMode::Batch,
            "sequential" => StepMode::Sequential,
            other => return Err(tokens.error(format!("Unknown step mode '{}'", other))),
        };
    }
    tokens.finish()?;

    Ok(SimulateDecl {
        dt,
        steps,
        mode,
        span: tokens.span,
    })
}

/// `detect name = position(a) | velocity(a) | speed(a) | distance(a, b)`
fn parse_detector(tokens: &mut Tokens) -> Result<DetectorDecl, ParseError> {
    let name = tokens.identifier("detector name")?;
    tokens.expect("=")?;
    let call = tokens.next_required("detector")?;
    tokens.finish()?;

    let open = call
        .find('(')
        .ok_or_else(|| tokens.error("Expected '(' in detector"))?;
    let close = call
        .rfind(')')
        .ok_or_else(|| tokens.error("Expected ')' in detector"))?;
    if close < open {
        return Err(tokens.error("Mismatched parentheses in detector"));
    }

    let func = call[..open].trim();
    let args: Vec<&str> = call[open + 1..close].split(',').map(|s| s.trim()).collect();
    for arg in &args {
        if !is_valid_identifier(arg) {
            return Err(tokens.error(format!("Invalid particle name '{}' in detector", arg)));
        }
    }

    let single = |args: &[&str]| -> Result<String, ParseError> {
        match args {
            [one] => Ok(one.to_string()),
            _ => Err(tokens.error(format!("Expected one particle name in {}()", func))),
        }
    };

    let kind = match func {
        "position" => DetectorKind::Position(single(&args)?),
        "velocity" => DetectorKind::Velocity(single(&args)?),
        "speed" => DetectorKind::Speed(single(&args)?),
        "distance" => match args.as_slice() {
            [a, b] => DetectorKind::Distance {
                a: a.to_string(),
                b: b.to_string(),
            },
            _ => {
                return Err(tokens.error("Expected two particle names in distance()"));
            }
        },
        other => return Err(tokens.error(format!("Unknown detector type '{}'", other))),
    };

    Ok(DetectorDecl {
        name,
        kind,
        span: tokens.span,
    })
}

fn parse_float(s: &str) -> Option<f32> {
    s.trim().parse::<f32>().ok()
}

/// `(x, y)` with optional whitespace
fn parse_vec2(s: &str) -> Option<Vec2> {
    let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split(',');
    let x = parse_float(parts.next()?)?;
    let y = parse_float(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Vec2::new(x, y))
}

fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
