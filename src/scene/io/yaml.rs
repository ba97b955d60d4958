use std::{collections::HashMap, fmt::Display};

use derive_builder::Builder;
use saphyr::Yaml;

use crate::{
    math::{color::Color, vector::Vector},
    scene::{
        SceneBuilder,
        light::PointLightSource,
        object::{
            material::{Albedo, Material},
            sphere::Sphere,
        },
    },
};

#[derive(Builder)]
/// The output of the parser. It keeps the scene as a builder and the image options as
/// `Option`s, because the cli options can override the values in the yaml file.
pub struct YamlSceneConfig {
    #[builder(setter(strip_option), default = "None")]
    pub width: Option<usize>,
    #[builder(setter(strip_option), default = "None")]
    pub height: Option<usize>,
    /// In degrees
    #[builder(setter(strip_option), default = "None")]
    pub field_of_view: Option<f64>,

    #[builder(setter(strip_option), default = "None")]
    pub max_reflective_depth: Option<usize>,
    #[builder(setter(strip_option), default = "None")]
    pub background: Option<Color>,

    #[builder(field(ty = "SceneBuilder", build = "self.scene_builder.clone()"))]
    pub scene_builder: SceneBuilder,
}

#[derive(Debug)]
pub enum YamlParseError {
    MissingField(&'static str),
    InvalidField,
    UnexpectedValue,
    UnknownDefine(String),
    RecursiveDefine(String),
    YamlSyntaxError(String),
    MultipleDocuments,
    InternalError(String),
}

impl Display for YamlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl std::error::Error for YamlParseError {}

const PREDEFINED_DEFINES: &str = r#"
- define: WHITE
  value: [ 1, 1, 1 ]
- define: BLACK
  value: [ 0, 0, 0 ]
- define: RED
  value: [ 1, 0, 0 ]
- define: GREEN
  value: [ 0, 1, 0 ]
- define: BLUE
  value: [ 0, 0, 1 ]
- define: BACKGROUND
  value: [ 0.2, 0.7, 0.8 ]

- define: IVORY
  value:
    color: [ 0.4, 0.4, 0.3 ]
    specular-exponent: 50
    albedo: [ 0.6, 0.3, 0.1 ]

- define: RED_RUBBER
  value:
    color: [ 0.3, 0.1, 0.1 ]
    specular-exponent: 10
    albedo: [ 0.9, 0.1, 0.0 ]

- define: MIRROR
  value:
    color: WHITE
    specular-exponent: 1425
    albedo: [ 0.0, 10.0, 0.8 ]
"#;

pub struct YamlParser<'a> {
    yaml: &'a Yaml,
    result: YamlSceneConfigBuilder,
    defines: HashMap<String, Yaml>,
}

type YamlParseResult<T> = Result<T, YamlParseError>;
type YamlParserOutput = YamlParseResult<YamlSceneConfig>;

impl<'a> YamlParser<'a> {
    fn new(yaml: &'a Yaml, defines: HashMap<String, Yaml>) -> Self {
        Self {
            yaml,
            result: YamlSceneConfigBuilder::default(),
            defines,
        }
    }

    pub fn with_predefined_defines(yaml: &'a Yaml) -> YamlParseResult<Self> {
        let predefined = Self::str_to_yaml(PREDEFINED_DEFINES)?;

        let mut predefined_parser = YamlParser::new(&predefined, HashMap::new());
        predefined_parser.parse()?;

        Ok(YamlParser::new(yaml, predefined_parser.defines))
    }

    /// Looks up a define, failing if `name` was already visited while resolving the
    /// current value.
    fn lookup_define(&self, name: &str, visited: &mut Vec<String>) -> YamlParseResult<&Yaml> {
        if visited.iter().any(|seen| seen == name) {
            return Err(YamlParseError::RecursiveDefine(name.to_string()));
        }
        visited.push(name.to_string());
        self.defines
            .get(name)
            .ok_or_else(|| YamlParseError::UnknownDefine(name.to_string()))
    }

    fn parse_num(&self, value: &Yaml) -> YamlParseResult<f64> {
        self.resolve_num(value, &mut Vec::new())
    }

    fn resolve_num(&self, value: &Yaml, visited: &mut Vec<String>) -> YamlParseResult<f64> {
        match value {
            Yaml::Integer(value) => Ok(*value as f64),
            Yaml::Real(value) => value.parse().map_err(|_| YamlParseError::InvalidField),
            Yaml::String(name) => {
                if let Some(string) = name.strip_prefix('-') {
                    let yaml = Yaml::from_str(string);
                    return self.resolve_num(&yaml, visited).map(|v| -v);
                }
                let value = self.lookup_define(name, visited)?;
                self.resolve_num(value, visited)
            }
            _ => Err(YamlParseError::InvalidField),
        }
    }

    fn parse_count(&self, value: &Yaml) -> YamlParseResult<usize> {
        match value {
            Yaml::Integer(value) => {
                usize::try_from(*value).map_err(|_| YamlParseError::InvalidField)
            }
            _ => Err(YamlParseError::InvalidField),
        }
    }

    fn parse_vec3(&self, value: &Yaml) -> YamlParseResult<(f64, f64, f64)> {
        let vec = value.as_vec().ok_or(YamlParseError::InvalidField)?;
        if vec.len() != 3 {
            return Err(YamlParseError::InvalidField);
        }
        Ok((
            self.parse_num(&vec[0])?,
            self.parse_num(&vec[1])?,
            self.parse_num(&vec[2])?,
        ))
    }

    fn parse_color(&self, value: &Yaml) -> YamlParseResult<Color> {
        self.resolve_color(value, &mut Vec::new())
    }

    fn resolve_color(&self, value: &Yaml, visited: &mut Vec<String>) -> YamlParseResult<Color> {
        if let Yaml::String(str_value) = value {
            let color = self.lookup_define(str_value, visited)?;
            return self.resolve_color(color, visited);
        }
        let (r, g, b) = self.parse_vec3(value)?;
        Ok(Color::new(r, g, b))
    }

    fn parse_vector(&self, value: &Yaml) -> YamlParseResult<Vector> {
        let (x, y, z) = self.parse_vec3(value)?;
        Ok(Vector::new(x, y, z))
    }

    fn parse_light(&self, body: &Yaml) -> YamlParseResult<PointLightSource> {
        let at = self.parse_vector(&body["at"])?;
        let intensity = match &body["intensity"] {
            Yaml::BadValue => 1.,
            val => self.parse_num(val)?,
        };

        Ok(PointLightSource::new(at, intensity))
    }

    fn parse_material(&self, body: &Yaml) -> YamlParseResult<Material> {
        self.resolve_material(body, &mut Vec::new())
    }

    fn resolve_material(
        &self,
        body: &Yaml,
        visited: &mut Vec<String>,
    ) -> YamlParseResult<Material> {
        match *body {
            Yaml::BadValue => {
                return Ok(Material::default());
            }
            Yaml::String(ref name) => {
                let material = self.lookup_define(name, visited)?;
                return self.resolve_material(material, visited);
            }
            _ => {}
        }
        let mut res = Material::default();

        if !body["color"].is_badvalue() {
            res.color = self.parse_color(&body["color"])?;
        }
        if !body["specular-exponent"].is_badvalue() {
            res.specular_exponent = self.parse_num(&body["specular-exponent"])?;
        }
        if !body["albedo"].is_badvalue() {
            let (diffuse, specular, reflective) = self.parse_vec3(&body["albedo"])?;
            res.albedo = Albedo::new(diffuse, specular, reflective);
        }

        Ok(res)
    }

    fn parse_sphere(&self, body: &Yaml) -> YamlParseResult<Sphere> {
        if body["center"].is_badvalue() {
            return Err(YamlParseError::MissingField("center"));
        }
        if body["radius"].is_badvalue() {
            return Err(YamlParseError::MissingField("radius"));
        }
        let center = self.parse_vector(&body["center"])?;
        let radius = self.parse_num(&body["radius"])?;
        let material = self.parse_material(&body["material"])?;

        Ok(Sphere::new(center, radius, material))
    }

    fn parse_camera(&mut self, body: &Yaml) -> YamlParseResult<()> {
        match &body["width"] {
            Yaml::BadValue => {}
            val => {
                self.result.width(self.parse_count(val)?);
            }
        }
        match &body["height"] {
            Yaml::BadValue => {}
            val => {
                self.result.height(self.parse_count(val)?);
            }
        }
        for key in ["fov", "field-of-view"] {
            match &body[key] {
                Yaml::BadValue => {}
                val => {
                    self.result.field_of_view(self.parse_num(val)?);
                }
            }
        }
        Ok(())
    }

    fn parse_options(&mut self, body: &Yaml) -> YamlParseResult<()> {
        match &body["reflective-depth"] {
            Yaml::BadValue => {}
            val => {
                self.result.max_reflective_depth(self.parse_count(val)?);
            }
        }
        match &body["far-plane"] {
            Yaml::BadValue => {}
            val => {
                self.result.scene_builder.far_plane(self.parse_num(val)?);
            }
        }
        match &body["background"] {
            Yaml::BadValue => {}
            val => {
                self.result.background(self.parse_color(val)?);
            }
        }
        Ok(())
    }

    fn parse_add(&mut self, what: &str, body: &Yaml) -> YamlParseResult<()> {
        match what {
            "camera" => self.parse_camera(body)?,
            "light" => {
                let light = self.parse_light(body)?;
                self.result.scene_builder.add_light_source(light);
            }
            "sphere" => {
                let sphere = self.parse_sphere(body)?;
                self.result.scene_builder.add_sphere(sphere);
            }
            name => {
                let body = self.expand_define(name, body)?;
                return self.parse_operation(&body);
            }
        }
        Ok(())
    }

    /// Merges `body` into the define it adds, following defines that add other defines
    /// until a built-in object is reached.
    fn expand_define(&self, name: &str, body: &Yaml) -> YamlParseResult<Yaml> {
        let mut visited = Vec::new();
        let mut name = name.to_string();
        let mut body = body.clone();
        loop {
            let define = self.lookup_define(&name, &mut visited)?;
            body = self.merge_use_define(define, &body)?;
            match body["add"].as_str() {
                Some("camera" | "light" | "sphere") | None => return Ok(body),
                Some(next) => name = next.to_string(),
            }
        }
    }

    fn merge_hash(&self, define_hash: &saphyr::Hash, use_hash: &saphyr::Hash) -> Yaml {
        let mut new_hash = define_hash.clone();

        for (key, value) in use_hash {
            let merged = match (define_hash.get(key), value) {
                (Some(Yaml::Hash(define_inner)), Yaml::Hash(use_inner)) => {
                    self.merge_hash(define_inner, use_inner)
                }
                _ => value.clone(),
            };
            new_hash.insert(key.clone(), merged);
        }
        Yaml::Hash(new_hash)
    }

    fn merge_use_define(&self, define_body: &Yaml, body: &Yaml) -> YamlParseResult<Yaml> {
        let extend_hash = define_body.as_hash().ok_or(YamlParseError::InvalidField)?;
        let mut body_hash = body.as_hash().ok_or(YamlParseError::InvalidField)?.clone();
        // the `add: <define>` entry would otherwise resolve to the define again
        body_hash.remove(&Yaml::String("add".to_string()));
        Ok(self.merge_hash(extend_hash, &body_hash))
    }

    fn parse_define(
        &mut self,
        name: &str,
        extends: Option<&str>,
        body: &Yaml,
    ) -> YamlParseResult<()> {
        let value = match extends {
            Some(extend) => {
                let extend = self
                    .defines
                    .get(extend)
                    .ok_or_else(|| YamlParseError::UnknownDefine(extend.to_string()))?;
                self.merge_use_define(extend, body)?
            }
            None => body.clone(),
        };
        self.defines.insert(name.to_string(), value);
        Ok(())
    }

    fn parse_operation(&mut self, yaml_obj: &Yaml) -> YamlParseResult<()> {
        if let Yaml::Hash(hash) = yaml_obj {
            match hash.front() {
                Some((Yaml::String(operation), Yaml::String(what))) => match operation.as_str() {
                    "add" => self.parse_add(what, yaml_obj)?,
                    "define" => {
                        let extends = yaml_obj["extend"].as_str();
                        let body = &yaml_obj["value"];
                        self.parse_define(what, extends, body)?;
                    }
                    _ => return Err(YamlParseError::UnexpectedValue),
                },
                Some((Yaml::String(operation), Yaml::Null)) => match operation.as_str() {
                    "camera" => self.parse_camera(yaml_obj)?,
                    "options" => self.parse_options(yaml_obj)?,
                    _ => return Err(YamlParseError::UnexpectedValue),
                },
                Some((Yaml::String(operation), body @ Yaml::Hash(_))) => {
                    match operation.as_str() {
                        "camera" => self.parse_camera(body)?,
                        "options" => self.parse_options(body)?,
                        _ => return Err(YamlParseError::UnexpectedValue),
                    }
                }
                _ => {
                    return Err(YamlParseError::UnexpectedValue);
                }
            }
        }
        Ok(())
    }

    fn parse(&mut self) -> YamlParseResult<()> {
        let Some(operations) = self.yaml.as_vec() else {
            return match self.yaml {
                Yaml::Null | Yaml::BadValue => Ok(()),
                _ => Err(YamlParseError::UnexpectedValue),
            };
        };
        for yaml_obj in operations {
            self.parse_operation(yaml_obj)?;
        }
        Ok(())
    }

    fn parse_consume(mut self) -> YamlParserOutput {
        self.parse()?;

        self.result
            .build()
            .map_err(|e| YamlParseError::InternalError(e.to_string()))
    }
}

impl YamlParser<'_> {
    fn str_to_yaml(source: &str) -> YamlParseResult<Yaml> {
        let mut docs = saphyr::Yaml::load_from_str(source)
            .map_err(|e| YamlParseError::YamlSyntaxError(e.to_string()))?;
        match docs.len() {
            1 => Ok(std::mem::replace(&mut docs[0], Yaml::BadValue)),
            0 => Ok(Yaml::Array(vec![])),
            _ => Err(YamlParseError::MultipleDocuments),
        }
    }
}

pub fn parse_str(source: &str) -> YamlParserOutput {
    let yaml = YamlParser::str_to_yaml(source)?;
    let parser = YamlParser::with_predefined_defines(&yaml)?;

    parser.parse_consume()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_approx_eq_low_prec, scene::Scene};

    fn test_parse(source: &str) -> (YamlSceneConfig, Scene) {
        let config = parse_str(source).unwrap();
        let scene = config.scene_builder.build().unwrap();
        (config, scene)
    }

    #[test]
    fn empty_yaml() {
        let (config, scene) = test_parse("");
        assert_eq!(scene, Scene::default());
        assert_eq!(config.width, None);
        assert_eq!(config.height, None);
        assert_eq!(config.field_of_view, None);
        assert_eq!(config.max_reflective_depth, None);
        assert_eq!(config.background, None);
    }

    #[test]
    fn comments_are_supported() {
        let (_, scene) = test_parse("#comment");
        assert_eq!(scene, Scene::default());
    }

    #[test]
    fn parse_light() {
        const LIGHT_YAML: &str = r#"
- add: light
  at: [ 50, 100, -50 ]
  intensity: 1.5
- add: light
  at: [ 0, 0, 0 ]
"#;
        let (_, scene) = test_parse(LIGHT_YAML);
        assert_eq!(
            scene.light_sources(),
            &[
                PointLightSource::new(Vector::new(50., 100., -50.), 1.5),
                PointLightSource::new(Vector::zero(), 1.),
            ]
        );
    }

    #[test]
    fn parse_camera() {
        const CAMERA_YAML: &str = r#"
- camera:
  width: 100
  height: 50
  fov: 60
"#;
        let (config, _) = test_parse(CAMERA_YAML);
        assert_eq!(config.width, Some(100));
        assert_eq!(config.height, Some(50));
        assert_approx_eq_low_prec!(config.field_of_view.unwrap(), 60.);
    }

    #[test]
    fn parse_nested_camera() {
        const CAMERA_YAML: &str = r#"
- camera:
    width: 320
    field-of-view: 45.5
"#;
        let (config, _) = test_parse(CAMERA_YAML);
        assert_eq!(config.width, Some(320));
        assert_eq!(config.height, None);
        assert_approx_eq_low_prec!(config.field_of_view.unwrap(), 45.5);
    }

    #[test]
    fn parse_options() {
        const OPTIONS_YAML: &str = r#"
- options:
  reflective-depth: 2
  far-plane: 500
  background: BLACK
"#;
        let (config, scene) = test_parse(OPTIONS_YAML);
        assert_eq!(config.max_reflective_depth, Some(2));
        assert_eq!(config.background, Some(Color::black()));
        assert_approx_eq_low_prec!(scene.far_plane(), 500.);
    }

    #[test]
    fn parse_sphere() {
        const SPHERE_YAML: &str = r#"
- add: sphere
  center: [ 0, 0, 5 ]
  radius: 1
  material:
    color: [ 1, 0, 0 ]
    specular-exponent: 10
    albedo: [ 1, 0, 0 ]
"#;
        let (_, scene) = test_parse(SPHERE_YAML);
        assert_eq!(
            scene.spheres(),
            &[Sphere::new(
                Vector::new(0., 0., 5.),
                1.,
                Material::new(Color::red(), 10., Albedo::new(1., 0., 0.))
            )]
        );
    }

    #[test]
    fn spheres_have_default_material() {
        const SPHERE_YAML: &str = r#"
- add: sphere
  center: [ 1, 2, 3 ]
  radius: 0.5
"#;
        let (_, scene) = test_parse(SPHERE_YAML);
        assert_eq!(scene.spheres()[0].material(), &Material::default());
    }

    #[test]
    fn sphere_without_radius_is_an_error() {
        let res = parse_str("- add: sphere\n  center: [ 1, 2, 3 ]\n");
        assert!(matches!(res, Err(YamlParseError::MissingField("radius"))));
    }

    #[test]
    fn predefined_materials() {
        const SPHERES_YAML: &str = r#"
- add: sphere
  center: [ -3, 0, 16 ]
  radius: 2
  material: IVORY
- add: sphere
  center: [ 1.5, -0.5, 18 ]
  radius: 3
  material: RED_RUBBER
- add: sphere
  center: [ 7, 5, 18 ]
  radius: 4
  material: MIRROR
"#;
        let (_, scene) = test_parse(SPHERES_YAML);
        let materials = scene
            .spheres()
            .iter()
            .map(|s| s.material().clone())
            .collect::<Vec<_>>();
        assert_eq!(
            materials,
            vec![Material::ivory(), Material::red_rubber(), Material::mirror()]
        );
    }

    #[test]
    fn parse_define_materials() {
        const DEFINE_YAML: &str = r#"
- define: GLOSSY_RED
  value:
    color: RED
    specular-exponent: 100
    albedo: [ 0.5, 0.5, 0.2 ]
- define: GLOSSY_BLUE
  extend: GLOSSY_RED
  value:
    color: [ 0, 0, 1 ]
- add: sphere
  center: [ 0, 0, 10 ]
  radius: 1
  material: GLOSSY_BLUE
"#;
        let (_, scene) = test_parse(DEFINE_YAML);
        assert_eq!(
            scene.spheres()[0].material(),
            &Material::new(Color::blue(), 100., Albedo::new(0.5, 0.5, 0.2))
        );
    }

    #[test]
    fn add_defined_object() {
        const DEFINE_YAML: &str = r#"
- define: BALL
  value:
    add: sphere
    radius: 2
    material: IVORY
- add: BALL
  center: [ 0, 1, 10 ]
"#;
        let (_, scene) = test_parse(DEFINE_YAML);
        assert_eq!(
            scene.spheres(),
            &[Sphere::new(Vector::new(0., 1., 10.), 2., Material::ivory())]
        );
    }

    #[test]
    fn parsing_negative_nums() {
        const NEG_YAML: &str = r#"
- define: DIST
  value: 4
- add: light
  at: [ -DIST, 2, -1.5 ]
"#;
        let (_, scene) = test_parse(NEG_YAML);
        assert_eq!(
            scene.light_sources()[0].position(),
            Vector::new(-4., 2., -1.5)
        );
    }

    #[test]
    fn unknown_define_is_an_error() {
        let res = parse_str("- add: sphere\n  center: [ 0, 0, 1 ]\n  radius: 1\n  material: GOLD\n");
        assert!(matches!(res, Err(YamlParseError::UnknownDefine(name)) if name == "GOLD"));
    }

    #[test]
    fn self_referencing_define_is_an_error() {
        const SELF_YAML: &str = r#"
- define: A
  value: A
- add: light
  at: [ A, 0, 0 ]
"#;
        let res = parse_str(SELF_YAML);
        assert!(matches!(res, Err(YamlParseError::RecursiveDefine(name)) if name == "A"));
    }

    #[test]
    fn mutually_referencing_defines_are_an_error() {
        const CYCLE_YAML: &str = r#"
- define: A
  value: -B
- define: B
  value: A
- add: light
  at: [ 0, 0, 0 ]
  intensity: A
"#;
        let res = parse_str(CYCLE_YAML);
        assert!(matches!(res, Err(YamlParseError::RecursiveDefine(name)) if name == "A"));
    }

    #[test]
    fn cyclic_color_and_material_defines_are_errors() {
        const COLOR_YAML: &str = r#"
- define: SKY
  value: HAZE
- define: HAZE
  value: SKY
- options:
  background: SKY
"#;
        assert!(matches!(
            parse_str(COLOR_YAML),
            Err(YamlParseError::RecursiveDefine(_))
        ));

        const MATERIAL_YAML: &str = r#"
- define: SHINY
  value: SHINY
- add: sphere
  center: [ 0, 0, 5 ]
  radius: 1
  material: SHINY
"#;
        assert!(matches!(
            parse_str(MATERIAL_YAML),
            Err(YamlParseError::RecursiveDefine(name)) if name == "SHINY"
        ));
    }

    #[test]
    fn define_adding_itself_is_an_error() {
        const ADD_YAML: &str = r#"
- define: BALL
  value:
    add: BOUNCY
    radius: 1
- define: BOUNCY
  value:
    add: BALL
    radius: 2
- add: BALL
  center: [ 0, 0, 5 ]
"#;
        assert!(matches!(
            parse_str(ADD_YAML),
            Err(YamlParseError::RecursiveDefine(name)) if name == "BALL"
        ));
    }

    #[test]
    fn define_chain_without_cycle_resolves() {
        const CHAIN_YAML: &str = r#"
- define: NEAR
  value: 2
- define: FAR
  value: -NEAR
- define: BALL
  value:
    add: sphere
    material: IVORY
- define: BIG_BALL
  value:
    add: BALL
    radius: 3
- add: BIG_BALL
  center: [ FAR, NEAR, 10 ]
"#;
        let (_, scene) = test_parse(CHAIN_YAML);
        assert_eq!(
            scene.spheres(),
            &[Sphere::new(Vector::new(-2., 2., 10.), 3., Material::ivory())]
        );
    }

    #[test]
    fn multiple_documents_are_an_error() {
        let res = parse_str("- add: light\n  at: [ 0, 0, 0 ]\n---\n- add: light\n  at: [ 0, 0, 0 ]\n");
        assert!(matches!(res, Err(YamlParseError::MultipleDocuments)));
    }

    #[test]
    fn invalid_vector_is_an_error() {
        let res = parse_str("- add: light\n  at: [ 0, 0 ]\n");
        assert!(matches!(res, Err(YamlParseError::InvalidField)));
    }

    #[test]
    fn invalid_sphere_fails_scene_validation() {
        let config = parse_str("- add: sphere\n  center: [ 0, 0, 1 ]\n  radius: -2\n").unwrap();
        assert!(config.scene_builder.build().is_err());
    }
}
