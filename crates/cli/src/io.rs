//! JSON documents describing polyhedra.
//!
//! Input: `{"topology": "closed"|"nnc", "dimension": n, "constraints": [...]}`
//! or the same with `"generators"`; exactly one of the two lists is given.
//! Coefficients are JSON integers, or decimal strings when they do not fit
//! in 64 bits.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use polydd::api::{
    Constraint, ConstraintKind, ConstraintSystem, Generator, GeneratorKind, GeneratorSystem,
    LinearExpression, Polyhedron, Topology,
};
use polydd::coefficient::Coefficient;
use serde::{Deserialize, Serialize};

/// Exact integer coefficient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CoeffRepr", into = "CoeffRepr")]
pub struct Coeff(pub Coefficient);

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CoeffRepr {
    Int(i64),
    Str(String),
}

impl TryFrom<CoeffRepr> for Coeff {
    type Error = String;

    fn try_from(r: CoeffRepr) -> std::result::Result<Self, String> {
        match r {
            CoeffRepr::Int(v) => Ok(Coeff(v.into())),
            CoeffRepr::Str(s) => s
                .trim()
                .parse::<Coefficient>()
                .map(Coeff)
                .map_err(|e| format!("invalid coefficient {s:?}: {e}")),
        }
    }
}

impl From<Coeff> for CoeffRepr {
    fn from(c: Coeff) -> Self {
        match i64::try_from(&c.0) {
            Ok(v) => CoeffRepr::Int(v),
            Err(_) => CoeffRepr::Str(c.0.to_string()),
        }
    }
}

impl From<i64> for Coeff {
    fn from(v: i64) -> Self {
        Coeff(v.into())
    }
}

impl fmt::Display for Coeff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyDoc {
    Closed,
    Nnc,
}

impl From<TopologyDoc> for Topology {
    fn from(t: TopologyDoc) -> Self {
        match t {
            TopologyDoc::Closed => Topology::Closed,
            TopologyDoc::Nnc => Topology::NotNecessarilyClosed,
        }
    }
}

impl From<Topology> for TopologyDoc {
    fn from(t: Topology) -> Self {
        match t {
            Topology::Closed => TopologyDoc::Closed,
            Topology::NotNecessarilyClosed => TopologyDoc::Nnc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationDoc {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
}

/// `coeffs · x + inhomogeneous (==|>=|>) 0`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintDoc {
    pub coeffs: Vec<Coeff>,
    #[serde(default = "zero")]
    pub inhomogeneous: Coeff,
    pub relation: RelationDoc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKindDoc {
    Point,
    ClosurePoint,
    Ray,
    Line,
}

/// A point or closure point `coeffs / divisor`, or the direction `coeffs`
/// of a ray or line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorDoc {
    pub kind: GeneratorKindDoc,
    pub coeffs: Vec<Coeff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divisor: Option<Coeff>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolyhedronDoc {
    pub topology: TopologyDoc,
    pub dimension: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Vec<ConstraintDoc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generators: Option<Vec<GeneratorDoc>>,
}

/// Both minimized systems of a polyhedron, as printed by `minimize`.
#[derive(Clone, Debug, Serialize)]
pub struct MinimizedDoc {
    pub topology: TopologyDoc,
    pub dimension: usize,
    pub empty: bool,
    pub constraints: Vec<ConstraintDoc>,
    pub generators: Vec<GeneratorDoc>,
}

fn zero() -> Coeff {
    Coeff::from(0)
}

fn expression(coeffs: &[Coeff], inhomogeneous: &Coeff) -> LinearExpression {
    LinearExpression::from_coefficients(coeffs.iter().map(|c| c.0.clone()), inhomogeneous.0.clone())
}

impl ConstraintDoc {
    pub fn to_constraint(&self) -> Constraint {
        let kind = match self.relation {
            RelationDoc::Equal => ConstraintKind::Equality,
            RelationDoc::GreaterOrEqual => ConstraintKind::NonStrictInequality,
            RelationDoc::GreaterThan => ConstraintKind::StrictInequality,
        };
        Constraint::new(expression(&self.coeffs, &self.inhomogeneous), kind)
    }

    pub fn from_constraint(c: &Constraint) -> Self {
        let e = c.expression();
        let relation = match c.kind() {
            ConstraintKind::Equality => RelationDoc::Equal,
            ConstraintKind::NonStrictInequality => RelationDoc::GreaterOrEqual,
            ConstraintKind::StrictInequality => RelationDoc::GreaterThan,
        };
        Self {
            coeffs: e.homogeneous_coefficients().iter().cloned().map(Coeff).collect(),
            inhomogeneous: Coeff(e.inhomogeneous_term().clone()),
            relation,
        }
    }
}

impl GeneratorDoc {
    pub fn to_generator(&self) -> Result<Generator> {
        let e = expression(&self.coeffs, &zero());
        let divisor = self.divisor.clone().unwrap_or_else(|| Coeff::from(1)).0;
        let g = match self.kind {
            GeneratorKindDoc::Point => Generator::point(e, divisor)?,
            GeneratorKindDoc::ClosurePoint => Generator::closure_point(e, divisor)?,
            GeneratorKindDoc::Ray => Generator::ray(e)?,
            GeneratorKindDoc::Line => Generator::line(e)?,
        };
        Ok(g)
    }

    pub fn from_generator(g: &Generator) -> Self {
        let (kind, divisor) = match g.kind() {
            GeneratorKind::Point => (GeneratorKindDoc::Point, Some(Coeff(g.divisor().clone()))),
            GeneratorKind::ClosurePoint => {
                (GeneratorKindDoc::ClosurePoint, Some(Coeff(g.divisor().clone())))
            }
            GeneratorKind::Ray => (GeneratorKindDoc::Ray, None),
            GeneratorKind::Line => (GeneratorKindDoc::Line, None),
        };
        Self {
            kind,
            coeffs: g
                .expression()
                .homogeneous_coefficients()
                .iter()
                .cloned()
                .map(Coeff)
                .collect(),
            divisor,
        }
    }
}

impl PolyhedronDoc {
    /// Build the polyhedron, rejecting malformed documents.
    pub fn build(&self) -> Result<Polyhedron> {
        let topology = Topology::from(self.topology);
        let dim = self.dimension;
        match (&self.constraints, &self.generators) {
            (Some(rows), None) => {
                let mut cs = ConstraintSystem::with_topology(topology, dim);
                for (i, row) in rows.iter().enumerate() {
                    if row.coeffs.len() > dim {
                        bail!("constraint {i} has {} coefficients, dimension is {dim}", row.coeffs.len());
                    }
                    cs.insert(row.to_constraint());
                }
                Ok(Polyhedron::from_recycled_constraints(topology, cs)?)
            }
            (None, Some(rows)) => {
                let mut gs = GeneratorSystem::with_topology(topology, dim);
                for (i, row) in rows.iter().enumerate() {
                    if row.coeffs.len() > dim {
                        bail!("generator {i} has {} coefficients, dimension is {dim}", row.coeffs.len());
                    }
                    gs.insert(row.to_generator().with_context(|| format!("generator {i}"))?);
                }
                Ok(Polyhedron::from_recycled_generators(topology, gs)?)
            }
            (Some(_), Some(_)) => bail!("give either constraints or generators, not both"),
            (None, None) => bail!("missing constraints or generators"),
        }
    }
}

impl MinimizedDoc {
    /// Both systems of `p`, minimized; `strong` also drops the rows of an
    /// NNC polyhedron that are redundant once epsilon is accounted for.
    pub fn describe(p: &mut Polyhedron, strong: bool) -> Self {
        let empty = !p.minimize();
        let cs = if strong {
            p.minimized_constraints()
        } else {
            p.constraints()
        };
        let constraints = cs.visible().map(ConstraintDoc::from_constraint).collect();
        let gs = if strong {
            p.minimized_generators()
        } else {
            p.generators()
        };
        let generators = gs.visible().map(GeneratorDoc::from_generator).collect();
        Self {
            topology: p.topology().into(),
            dimension: p.space_dimension(),
            empty,
            constraints,
            generators,
        }
    }
}

/// Read and parse a polyhedron document.
pub fn load(path: &Path) -> Result<PolyhedronDoc> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Read, parse and build a polyhedron.
pub fn load_polyhedron(path: &Path) -> Result<Polyhedron> {
    load(path)?
        .build()
        .with_context(|| format!("building polyhedron from {}", path.display()))
}

/// Parse a linear expression written as a JSON document
/// `{"coeffs": [..], "inhomogeneous": b}`.
pub fn parse_expression(text: &str) -> Result<LinearExpression> {
    #[derive(Deserialize)]
    struct ExprDoc {
        coeffs: Vec<Coeff>,
        #[serde(default = "zero")]
        inhomogeneous: Coeff,
    }
    let doc: ExprDoc = serde_json::from_str(text).context("parsing expression")?;
    Ok(expression(&doc.coeffs, &doc.inhomogeneous))
}

/// Pretty JSON to `out`, creating parent directories, or to stdout.
pub fn emit<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
            }
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_a_square_from_constraints() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "square.json",
            r#"{"topology": "closed", "dimension": 2, "constraints": [
                {"coeffs": [1, 0], "relation": ">="},
                {"coeffs": [-1, 0], "inhomogeneous": 2, "relation": ">="},
                {"coeffs": [0, 1], "relation": ">="},
                {"coeffs": [0, -1], "inhomogeneous": 2, "relation": ">="}
            ]}"#,
        );
        let mut p = load_polyhedron(&path).unwrap();
        let doc = MinimizedDoc::describe(&mut p, true);
        assert!(!doc.empty);
        assert_eq!(doc.generators.len(), 4);
        assert!(doc.generators.iter().all(|g| g.kind == GeneratorKindDoc::Point));
        assert_eq!(doc.constraints.len(), 4);
    }

    #[test]
    fn loads_nnc_generators_and_big_coefficients() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "segment.json",
            r#"{"topology": "nnc", "dimension": 1, "generators": [
                {"kind": "point", "coeffs": [0]},
                {"kind": "closure_point", "coeffs": ["100000000000000000000"], "divisor": 3}
            ]}"#,
        );
        let mut p = load_polyhedron(&path).unwrap();
        let doc = MinimizedDoc::describe(&mut p, true);
        assert_eq!(doc.topology, TopologyDoc::Nnc);
        assert!(doc
            .constraints
            .iter()
            .any(|c| c.relation == RelationDoc::GreaterThan));
        let text = serde_json::to_string(&doc.generators).unwrap();
        assert!(text.contains("\"100000000000000000000\""));
    }

    #[test]
    fn strong_and_plain_descriptions_agree_on_the_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "strip.json",
            r#"{"topology": "nnc", "dimension": 2, "constraints": [
                {"coeffs": [1, 0], "relation": ">"},
                {"coeffs": [-1, 0], "inhomogeneous": 1, "relation": ">"},
                {"coeffs": [0, 1], "relation": ">="},
                {"coeffs": [0, -1], "inhomogeneous": 1, "relation": ">="}
            ]}"#,
        );
        let plain = MinimizedDoc::describe(&mut load_polyhedron(&path).unwrap(), false);
        let strong = MinimizedDoc::describe(&mut load_polyhedron(&path).unwrap(), true);
        assert!(!plain.empty && !strong.empty);
        assert!(strong.constraints.len() <= plain.constraints.len());
        assert!(strong.generators.len() <= plain.generators.len());

        let rebuild = |constraints: Vec<ConstraintDoc>| {
            PolyhedronDoc {
                topology: TopologyDoc::Nnc,
                dimension: 2,
                constraints: Some(constraints),
                generators: None,
            }
            .build()
            .unwrap()
        };
        let mut x = rebuild(plain.constraints);
        let mut y = rebuild(strong.constraints);
        assert!(x.equals(&mut y).unwrap());
    }

    #[test]
    fn rejects_malformed_documents() {
        let dir = tempfile::tempdir().unwrap();
        let both = write_temp(
            &dir,
            "both.json",
            r#"{"topology": "closed", "dimension": 1, "constraints": [], "generators": []}"#,
        );
        assert!(load_polyhedron(&both).is_err());
        let wide = write_temp(
            &dir,
            "wide.json",
            r#"{"topology": "closed", "dimension": 1,
                "constraints": [{"coeffs": [1, 1], "relation": ">="}]}"#,
        );
        assert!(load_polyhedron(&wide).is_err());
        let strict = write_temp(
            &dir,
            "strict.json",
            r#"{"topology": "closed", "dimension": 1,
                "constraints": [{"coeffs": [1], "relation": ">"}]}"#,
        );
        assert!(load_polyhedron(&strict).is_err());
        let rays_only = write_temp(
            &dir,
            "rays.json",
            r#"{"topology": "closed", "dimension": 1,
                "generators": [{"kind": "ray", "coeffs": [1]}]}"#,
        );
        assert!(load_polyhedron(&rays_only).is_err());
        assert!(load_polyhedron(&dir.path().join("missing.json")).is_err());
    }

    #[test]
    fn expressions_and_output_files() {
        let e = parse_expression(r#"{"coeffs": [2, -1], "inhomogeneous": 3}"#).unwrap();
        assert_eq!(e.space_dimension(), 2);
        assert_eq!(*e.inhomogeneous_term(), Coefficient::from(3));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out.json");
        emit(&serde_json::json!({"ok": true}), Some(&out)).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back["ok"], true);
    }
}
