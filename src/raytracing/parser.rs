use thiserror::Error;

use super::{
    camera::DEFAULT_DIVISIONS,
    core::{Material, Scene, SceneError, SceneObject, Solid, DEFAULT_COEFFICIENT},
    Vec3,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePosition {
    pub line: u32,
    pub column: u32,
    index: usize,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            index: 0,
        }
    }

    fn advance(&mut self, current: char) {
        if current == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.index += 1;
    }
}

#[derive(Error, Debug)]
#[error("{} at {}:{}", .message, .position.line + 1, .position.column + 1)]
pub struct ParserError {
    pub position: FilePosition,
    pub message: String,
}

impl ParserError {
    fn new(message: impl Into<String>, position: FilePosition) -> ParserError {
        ParserError {
            position,
            message: message.into(),
        }
    }

    /// Prints the offending line with a caret under the error position.
    pub fn print_error_location(&self, content: &str) {
        eprintln!("{}", self);
        if let Some(line) = content.lines().nth(self.position.line as usize) {
            eprintln!("{}", line);
            eprintln!("{}^", " ".repeat(self.position.column as usize));
        }
    }
}

type ParserResult<T> = Result<T, ParserError>;

/// Everything described by a scene file.
pub struct SceneDescription {
    pub divisions: u32,
    pub fog: bool,
    pub texture: Option<String>,
    pub scene: Scene,
}

pub struct SceneParser {
    chars: Vec<char>,
    position: FilePosition,
    // start of the last token returned by pop
    token_start: FilePosition,
    peeked: Option<(String, FilePosition)>,
    // where each parsed object begins, used to locate scene validation errors
    object_starts: Vec<FilePosition>,
}

impl SceneParser {
    pub fn new(content: &str) -> SceneParser {
        SceneParser {
            chars: content.chars().collect(),
            position: FilePosition::new(),
            token_start: FilePosition::new(),
            peeked: None,
            object_starts: Vec::new(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.chars.get(self.position.index).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let current = self.current_char()?;
        self.position.advance(current);
        Some(current)
    }

    fn eat_spaces(&mut self) {
        // consume whitespace and comments up to the next token
        while let Some(current) = self.current_char() {
            if current == '#' {
                while !matches!(self.current_char(), None | Some('\n')) {
                    self.bump();
                }
            } else if current.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn bump_while(&mut self, token: &mut String, f: impl Fn(char) -> bool) {
        while let Some(current) = self.current_char() {
            if !f(current) {
                break;
            }
            token.push(current);
            self.bump();
        }
    }

    fn lex(&mut self) -> (String, FilePosition) {
        self.eat_spaces();
        let start = self.position;
        let mut token = String::new();
        let Some(first) = self.current_char() else {
            return (token, start);
        };

        match first {
            ',' | '(' | ')' => {
                token.push(first);
                self.bump();
            }
            '"' => {
                // no escapes inside strings
                token.push(first);
                self.bump();
                self.bump_while(&mut token, |c| c != '"' && c != '\n');
                if self.current_char() == Some('"') {
                    token.push('"');
                    self.bump();
                }
            }
            '+' | '-' | '.' | '0'..='9' => {
                token.push(first);
                self.bump();
                self.bump_while(&mut token, |c| c.is_ascii_digit() || c == '.');
            }
            c if c.is_alphabetic() => {
                self.bump_while(&mut token, |c| c.is_alphanumeric() || c == '_');
            }
            other => {
                // unknown symbols are returned alone so the caller can report them
                token.push(other);
                self.bump();
            }
        }
        (token, start)
    }

    fn pop(&mut self) -> String {
        let (token, start) = self.peeked.take().unwrap_or_else(|| self.lex());
        self.token_start = start;
        token
    }

    fn peek(&mut self) -> &str {
        if self.peeked.is_none() {
            let next = self.lex();
            self.peeked = Some(next);
        }
        self.peeked.as_ref().map(|(token, _)| token.as_str()).unwrap_or("")
    }

    fn error<T>(&self, message: impl Into<String>) -> ParserResult<T> {
        Err(ParserError::new(message, self.token_start))
    }

    fn parse_float(&mut self) -> ParserResult<f64> {
        let token = self.pop();
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => self.error(format!("cannot interpret '{}' as a number", token)),
        }
    }

    fn parse_positive_integer(&mut self) -> ParserResult<u32> {
        let token = self.pop();
        match token.parse::<u32>() {
            Ok(value) if value > 0 => Ok(value),
            _ => self.error(format!("expected a positive integer, got '{}'", token)),
        }
    }

    /// Consumes a float only when the next token is a number.
    fn maybe_float(&mut self) -> ParserResult<Option<f64>> {
        if self.peek().parse::<f64>().is_ok() {
            Ok(Some(self.parse_float()?))
        } else {
            Ok(None)
        }
    }

    fn match_token(&mut self, expected: &str) -> ParserResult<()> {
        let token = self.pop();
        if token != expected {
            return self.error(format!("expected '{}', got '{}' instead", expected, token));
        }
        Ok(())
    }

    fn maybe_match(&mut self, expected: &str) -> bool {
        if self.peek() == expected {
            self.pop();
            return true;
        }
        false
    }

    fn parse_vec3(&mut self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(&mut self) -> ParserResult<Vec3> {
        if self.peek() == "(" {
            return self.parse_vec3();
        }
        let name = self.pop();
        match named_color(&name) {
            Some(color) => Ok(color),
            None => self.error(format!("unknown color '{}'", name)),
        }
    }

    fn parse_string(&mut self) -> ParserResult<String> {
        let token = self.pop();
        if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
            Ok(token[1..token.len() - 1].to_string())
        } else {
            self.error(format!("expected a quoted string, got '{}'", token))
        }
    }

    fn parse_coefficient(&mut self) -> ParserResult<f64> {
        Ok(self.maybe_float()?.unwrap_or(DEFAULT_COEFFICIENT))
    }

    /// Parses the color and the options following it.
    fn parse_material(&mut self, index: usize, roles: &mut Roles) -> ParserResult<Material> {
        let mut material = Material::with_color(self.parse_color()?);
        loop {
            if self.maybe_match("shininess") {
                material.shininess = self.parse_float()?;
            } else if self.maybe_match("matte") {
                material.specular = false;
            } else if self.maybe_match("reflective") {
                material.reflective = Some(self.parse_coefficient()?);
            } else if self.maybe_match("transparent") {
                material.transparent = Some(self.parse_coefficient()?);
            } else if self.maybe_match("refractive") {
                material.refractive = true;
            } else if self.maybe_match("floor") {
                if roles.floor.replace(index).is_some() {
                    return self.error("only one object can be the floor");
                }
            } else if self.maybe_match("textured") {
                if roles.textured.replace(index).is_some() {
                    return self.error("only one object can be textured");
                }
            } else {
                return Ok(material);
            }
        }
    }

    fn parse_solid(&mut self) -> ParserResult<Solid> {
        let kind = self.pop();
        self.object_starts.push(self.token_start);
        match kind.as_str() {
            "sphere" => {
                let center = self.parse_vec3()?;
                let radius = self.parse_float()?;
                Ok(Solid::Sphere { center, radius })
            }
            "plane" => {
                let a = self.parse_vec3()?;
                let b = self.parse_vec3()?;
                let c = self.parse_vec3()?;
                let d = self.parse_vec3()?;
                Ok(Solid::plane(a, b, c, d))
            }
            "cylinder" => {
                let base = self.parse_vec3()?;
                let radius = self.parse_float()?;
                let height = self.parse_float()?;
                Ok(Solid::Cylinder {
                    base,
                    radius,
                    height,
                })
            }
            "cone" => {
                let base = self.parse_vec3()?;
                let radius = self.parse_float()?;
                let height = self.parse_float()?;
                Ok(Solid::Cone {
                    base,
                    radius,
                    height,
                })
            }
            _ => self.error(format!("unknown object '{}'", kind)),
        }
    }

    /// Main routine that parses the whole file.
    pub fn parse_scene(&mut self) -> ParserResult<SceneDescription> {
        let mut divisions = DEFAULT_DIVISIONS;
        let mut fog = false;
        let mut texture = None;
        let mut light = None;
        let mut roles = Roles::default();
        let mut objects = Vec::new();

        loop {
            match self.peek() {
                "" => break,
                "size" => {
                    self.pop();
                    divisions = self.parse_positive_integer()?;
                }
                "fog" => {
                    self.pop();
                    fog = true;
                }
                "texture" => {
                    self.pop();
                    texture = Some(self.parse_string()?);
                }
                "light" => {
                    self.pop();
                    let start = self.token_start;
                    let position = self.parse_vec3()?;
                    if light.replace(position).is_some() {
                        return Err(ParserError::new("only one light is supported", start));
                    }
                }
                "sphere" | "plane" | "cylinder" | "cone" => {
                    let solid = self.parse_solid()?;
                    let material = self.parse_material(objects.len(), &mut roles)?;
                    objects.push(SceneObject::new(solid, material));
                }
                _ => {
                    let token = self.pop();
                    return self.error(format!("unexpected token '{}'", token));
                }
            }
        }

        let Some(light) = light else {
            return self.error("the scene needs a light");
        };
        let end = self.position;
        let at_object = |err: SceneError| {
            let position = scene_error_index(&err)
                .and_then(|i| self.object_starts.get(i).copied())
                .unwrap_or(end);
            ParserError::new(err.to_string(), position)
        };

        let mut scene = Scene::new(objects, light).map_err(at_object)?;
        if let Some(index) = roles.floor {
            scene = scene.with_floor(index).map_err(at_object)?;
        }
        if let Some(index) = roles.textured {
            scene = scene.with_textured(index).map_err(at_object)?;
        }
        log::debug!(
            "parsed {} objects, light at {:?}",
            scene.objects.len(),
            scene.light.position
        );

        Ok(SceneDescription {
            divisions,
            fog,
            texture,
            scene,
        })
    }
}

#[derive(Default)]
struct Roles {
    floor: Option<usize>,
    textured: Option<usize>,
}

fn scene_error_index(err: &SceneError) -> Option<usize> {
    match *err {
        SceneError::NonPositiveRadius { index, .. }
        | SceneError::NonPositiveHeight { index, .. }
        | SceneError::DegeneratePlane { index }
        | SceneError::CoefficientOutOfRange { index, .. }
        | SceneError::NonFinite { index }
        | SceneError::MissingObject { index, .. }
        | SceneError::TexturedNotSphere { index } => Some(index),
    }
}

fn named_color(name: &str) -> Option<Vec3> {
    let color = match name {
        "red" => Vec3::new(1.0, 0.0, 0.0),
        "green" => Vec3::new(0.0, 1.0, 0.0),
        "blue" => Vec3::new(0.0, 0.0, 1.0),
        "white" => Vec3::new(1.0, 1.0, 1.0),
        "black" => Vec3::new(0.0, 0.0, 0.0),
        "gray" => Vec3::new(0.5, 0.5, 0.5),
        "cyan" => Vec3::new(0.0, 1.0, 1.0),
        "violet" => Vec3::new(1.0, 0.0, 1.0),
        "yellow" => Vec3::new(1.0, 1.0, 0.0),
        "orange" => Vec3::new(0.98, 0.45, 0.02),
        _ => return None,
    };
    Some(color)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParserResult<SceneDescription> {
        SceneParser::new(content).parse_scene()
    }

    #[test]
    fn test_parse_full_scene() {
        let content = r#"
            # a comment line
            size 64
            fog
            texture "textures/disco.bmp"
            light (0, 29, -40)
            sphere (-5, 0, -90) 4 blue textured
            sphere (5, 5, -70) 4 red shininess 5 transparent 0.6   # trailing comment
            plane (-40, -15, 40) (40, -15, 40) (40, -15, -220) (-40, -15, -220) white floor
            cylinder (18, -15, -60) 5 5 (0, 0, 1)
            cone (-30, -15, -160) 5 10 green matte reflective refractive
        "#;
        let description = parse(content).unwrap();
        assert_eq!(description.divisions, 64);
        assert!(description.fog);
        assert_eq!(description.texture.as_deref(), Some("textures/disco.bmp"));

        let scene = description.scene;
        assert_eq!(scene.objects.len(), 5);
        assert_eq!(scene.light.position, Vec3::new(0.0, 29.0, -40.0));
        assert_eq!(scene.textured, Some(0));
        assert_eq!(scene.floor, Some(2));

        let glass = scene.objects[1].material;
        assert_eq!(glass.color, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(glass.shininess, 5.0);
        assert_eq!(glass.transparent, Some(0.6));
        assert!(glass.specular);

        let cone = scene.objects[4].material;
        assert!(!cone.specular);
        assert_eq!(cone.reflective, Some(DEFAULT_COEFFICIENT));
        assert!(cone.refractive);
        assert!(matches!(scene.objects[4].solid, Solid::Cone { height, .. } if height == 10.0));
    }

    #[test]
    fn test_defaults() {
        let description = parse("light (0, 10, 0)\nsphere (0, 0, -10) 1.5 white").unwrap();
        assert_eq!(description.divisions, DEFAULT_DIVISIONS);
        assert!(!description.fog);
        assert!(description.texture.is_none());
        assert_eq!(description.scene.objects[0].material, Material::default());
    }

    #[test]
    fn test_missing_light() {
        let err = parse("sphere (0, 0, -10) 1 red").err().unwrap();
        assert!(err.message.contains("light"));
    }

    #[test]
    fn test_second_light_is_rejected() {
        let err = parse("light (0, 1, 0)\nlight (0, 2, 0)").err().unwrap();
        assert_eq!(err.position.line, 1);
    }

    #[test]
    fn test_error_position_points_to_token() {
        let err = parse("light (0, 1, 0)\nsphere (0, 0, x) 1 red").err().unwrap();
        assert_eq!(err.position.line, 1);
        assert_eq!(err.position.column, 14);
        assert_eq!(err.to_string(), "cannot interpret 'x' as a number at 2:15");
    }

    #[test]
    fn test_unknown_color_and_token() {
        let err = parse("light (0, 1, 0)\nsphere (0, 0, 0) 1 mauve").err().unwrap();
        assert!(err.message.contains("mauve"));
        let err = parse("light (0, 1, 0)\ntorus (0, 0, 0) 1 red").err().unwrap();
        assert!(err.message.contains("torus"));
    }

    #[test]
    fn test_invalid_object_is_reported_on_its_line() {
        let err = parse("light (0, 1, 0)\nsphere (0, 0, 0) 1 red\nsphere (0, 0, 0) -2 red")
            .err()
            .unwrap();
        assert_eq!(err.position.line, 2);
        assert!(err.message.contains("radius"));
    }

    #[test]
    fn test_second_floor_is_rejected() {
        let content = "light (0, 1, 0)\nsphere (0, 0, 0) 1 red floor\nsphere (0, 0, 5) 1 white matte floor";
        let err = parse(content).err().unwrap();
        assert_eq!(err.position.line, 2);
        assert!(err.message.contains("floor"));
    }

    #[test]
    fn test_textured_must_be_sphere() {
        let content = "light (0, 1, 0)\ncone (0, 0, 0) 1 2 red textured";
        let err = parse(content).err().unwrap();
        assert!(err.message.contains("sphere"));
    }

    #[test]
    fn test_sample_file_matches_builtin_room() {
        let description = parse(include_str!("../../scenes/classroom.scene")).unwrap();
        let room = crate::raytracing::scenes::classroom().unwrap();
        assert_eq!(
            description.texture.as_deref(),
            Some(crate::raytracing::scenes::CLASSROOM_TEXTURE)
        );
        let parsed = description.scene;
        assert_eq!(parsed.objects.len(), room.objects.len());
        assert_eq!(parsed.floor, room.floor);
        assert_eq!(parsed.textured, room.textured);
        assert_eq!(parsed.light.position, room.light.position);
        for (a, b) in parsed.objects.iter().zip(room.objects.iter()) {
            assert_eq!(a.material, b.material);
        }
    }
}
