//! JSON program descriptions.
//!
//! The CLI consumes a host-exported snapshot of the program: type
//! declarations, constants, and the switch constructs to analyze, all keyed
//! by type name. Loading interns names into [`TypeId`]s and produces the
//! same construct shapes the engine sees from a live host.

use crate::config::WellKnownTypes;
use crate::error::{MatchlockError, MatchlockResult};
use crate::model::{Program, ProgramBuilder};
use crate::semantic::{Accessibility, ConstId, IntegralType, TypeId, TypeUse};
use crate::syntax::{
    ArmEffect, BinOp, CastTarget, Expr, Location, Pattern, SwitchArm, SwitchNode, TypeDeclNode,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A fully-resolved program description, ready for
/// [`crate::engine::analyze_program`].
#[derive(Debug)]
pub struct LoadedProgram {
    pub program: Program,
    pub well_known: WellKnownTypes,
    pub switches: Vec<SwitchNode>,
    pub declarations: Vec<TypeDeclNode>,
}

#[derive(Debug, Deserialize)]
struct ProgramDoc {
    #[serde(default)]
    sentinels: SentinelsDoc,
    #[serde(default)]
    types: Vec<TypeDoc>,
    #[serde(default)]
    constants: Vec<ConstDoc>,
    #[serde(default)]
    switches: Vec<SwitchDoc>,
    #[serde(default)]
    declarations: Vec<DeclDoc>,
}

#[derive(Debug, Deserialize, Default)]
struct SentinelsDoc {
    match_failed: Option<String>,
    invalid_enum_argument: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TypeDoc {
    name: String,
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default, rename = "abstract")]
    is_abstract: bool,
    #[serde(default)]
    sealed: bool,
    #[serde(default)]
    supertypes: Vec<String>,
    /// One case list per closure annotation occurrence.
    #[serde(default)]
    cases: Vec<Vec<String>>,
    #[serde(default)]
    constructors: Vec<String>,
    underlying: Option<String>,
    #[serde(default)]
    members: Vec<MemberDoc>,
}

fn default_kind() -> String {
    "class".to_string()
}

#[derive(Debug, Deserialize)]
struct MemberDoc {
    name: String,
    value: i128,
}

#[derive(Debug, Deserialize)]
struct ConstDoc {
    name: String,
    init: ExprDoc,
}

/// Deserializes an `i128` inside an internally tagged enum. Serde buffers
/// tagged-enum content through a representation with no i128 variant, so the
/// value arrives as i64/u64 and must be widened here.
fn de_i128<'de, D: serde::Deserializer<'de>>(d: D) -> Result<i128, D::Error> {
    struct V;
    impl<'de> serde::de::Visitor<'de> for V {
        type Value = i128;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("an integer")
        }
        fn visit_i64<E>(self, v: i64) -> Result<i128, E> {
            Ok(v as i128)
        }
        fn visit_u64<E>(self, v: u64) -> Result<i128, E> {
            Ok(v as i128)
        }
        fn visit_i128<E>(self, v: i128) -> Result<i128, E> {
            Ok(v)
        }
        fn visit_u128<E: serde::de::Error>(self, v: u128) -> Result<i128, E> {
            i128::try_from(v).map_err(E::custom)
        }
    }
    d.deserialize_any(V)
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ExprDoc {
    Int {
        #[serde(deserialize_with = "de_i128")]
        value: i128,
    },
    EnumMember {
        ty: String,
        member: String,
    },
    Const {
        name: String,
    },
    Cast {
        /// Integral type name (`u8`, `i32`, ...) or a declared type name.
        target: String,
        operand: Box<ExprDoc>,
    },
    Add {
        lhs: Box<ExprDoc>,
        rhs: Box<ExprDoc>,
    },
    Sub {
        lhs: Box<ExprDoc>,
        rhs: Box<ExprDoc>,
    },
    Opaque,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum PatternDoc {
    Type {
        ty: String,
        #[serde(default)]
        binding: Option<String>,
    },
    Expr {
        expr: ExprDoc,
    },
    Null,
    Discard,
    Var {
        name: String,
    },
    Tuple,
    Property,
    Relational,
}

#[derive(Debug, Deserialize)]
struct ArmDoc {
    line: usize,
    #[serde(default = "default_column")]
    column: usize,
    pattern: PatternDoc,
    #[serde(default)]
    guard: bool,
    /// Type the arm body unconditionally raises, if any.
    throws: Option<String>,
}

fn default_column() -> usize {
    1
}

#[derive(Debug, Deserialize)]
struct SwitchDoc {
    file: String,
    line: usize,
    #[serde(default = "default_column")]
    column: usize,
    scrutinee: Option<String>,
    #[serde(default)]
    nullable: bool,
    arms: Vec<ArmDoc>,
}

#[derive(Debug, Deserialize)]
struct DeclDoc {
    ty: String,
    file: String,
    line: usize,
    #[serde(default = "default_column")]
    column: usize,
}

/// Load a program description from a JSON file.
pub fn load_program(path: &Path) -> MatchlockResult<LoadedProgram> {
    let content =
        fs::read_to_string(path).map_err(|e| MatchlockError::load(path, e.to_string()))?;
    parse_program(&content, path)
}

/// Parse a program description from a JSON string; `origin` is used only
/// for error context.
pub fn parse_program(json: &str, origin: &Path) -> MatchlockResult<LoadedProgram> {
    let doc: ProgramDoc =
        serde_json::from_str(json).map_err(|e| MatchlockError::load(origin, e.to_string()))?;
    Resolver::new(origin).resolve(doc)
}

struct Resolver<'a> {
    origin: &'a Path,
    type_ids: HashMap<String, TypeId>,
    const_ids: HashMap<String, ConstId>,
}

impl<'a> Resolver<'a> {
    fn new(origin: &'a Path) -> Self {
        Self {
            origin,
            type_ids: HashMap::new(),
            const_ids: HashMap::new(),
        }
    }

    fn err(&self, message: impl Into<String>) -> MatchlockError {
        MatchlockError::load(self.origin, message)
    }

    fn type_id(&self, name: &str) -> MatchlockResult<TypeId> {
        self.type_ids
            .get(name)
            .copied()
            .ok_or_else(|| self.err(format!("unknown type '{}'", name)))
    }

    fn resolve(mut self, doc: ProgramDoc) -> MatchlockResult<LoadedProgram> {
        let mut builder = ProgramBuilder::new();

        // First pass: intern every type name.
        for ty in &doc.types {
            let id = match ty.kind.as_str() {
                "class" => {
                    if ty.is_abstract {
                        builder.abstract_class(&ty.name)
                    } else {
                        builder.class(&ty.name)
                    }
                }
                "interface" => builder.interface(&ty.name),
                "struct" => builder.struct_type(&ty.name),
                "enum" => {
                    let underlying = parse_integral(
                        ty.underlying.as_deref().unwrap_or("i32"),
                    )
                    .ok_or_else(|| {
                        self.err(format!("enum '{}' has an invalid underlying type", ty.name))
                    })?;
                    let members: Vec<(&str, i128)> = ty
                        .members
                        .iter()
                        .map(|m| (m.name.as_str(), m.value))
                        .collect();
                    builder.enum_type(&ty.name, underlying, &members)
                }
                other => {
                    return Err(self.err(format!(
                        "type '{}' has unknown kind '{}'",
                        ty.name, other
                    )))
                }
            };
            if ty.sealed {
                builder.sealed(id);
            }
            if self.type_ids.insert(ty.name.clone(), id).is_some() {
                return Err(self.err(format!("type '{}' declared twice", ty.name)));
            }
        }

        // Second pass: supertypes, closures, constructors.
        for ty in &doc.types {
            let id = self.type_ids[&ty.name];
            for sup in &ty.supertypes {
                let sup_id = self.type_id(sup)?;
                builder.extends(id, sup_id);
            }
            for case_list in &ty.cases {
                let cases: Vec<TypeId> = case_list
                    .iter()
                    .map(|c| self.type_id(c))
                    .collect::<MatchlockResult<_>>()?;
                builder.closed(id, &cases);
            }
            if !ty.constructors.is_empty() {
                let accs: Vec<Accessibility> = ty
                    .constructors
                    .iter()
                    .map(|a| {
                        parse_accessibility(a)
                            .ok_or_else(|| self.err(format!("unknown accessibility '{}'", a)))
                    })
                    .collect::<MatchlockResult<_>>()?;
                builder.ctors(id, &accs);
            }
        }

        // Constants: intern names first so initializers may refer to each
        // other in any order.
        for c in &doc.constants {
            let id = builder.constant(Expr::Opaque);
            if self.const_ids.insert(c.name.clone(), id).is_some() {
                return Err(self.err(format!("constant '{}' declared twice", c.name)));
            }
        }
        for c in &doc.constants {
            let id = self.const_ids[&c.name];
            let init = self.expr(&c.init)?;
            builder.set_constant(id, init);
        }

        let well_known = WellKnownTypes {
            match_failed: self.optional_type(doc.sentinels.match_failed.as_deref())?,
            invalid_enum_argument: self
                .optional_type(doc.sentinels.invalid_enum_argument.as_deref())?,
        };

        let switches = doc
            .switches
            .iter()
            .map(|s| self.switch(s))
            .collect::<MatchlockResult<_>>()?;
        let declarations = doc
            .declarations
            .iter()
            .map(|d| {
                Ok(TypeDeclNode {
                    ty: self.type_id(&d.ty)?,
                    location: Location::new(&d.file, d.line, d.column),
                })
            })
            .collect::<MatchlockResult<_>>()?;

        Ok(LoadedProgram {
            program: builder.build(),
            well_known,
            switches,
            declarations,
        })
    }

    fn optional_type(&self, name: Option<&str>) -> MatchlockResult<Option<TypeId>> {
        name.map(|n| self.type_id(n)).transpose()
    }

    fn switch(&self, doc: &SwitchDoc) -> MatchlockResult<SwitchNode> {
        let scrutinee = match &doc.scrutinee {
            Some(name) => {
                let ty = self.type_id(name)?;
                Some(if doc.nullable {
                    TypeUse::nullable(ty)
                } else {
                    TypeUse::new(ty)
                })
            }
            None => None,
        };
        let arms = doc
            .arms
            .iter()
            .map(|a| self.arm(a, &doc.file))
            .collect::<MatchlockResult<_>>()?;
        Ok(SwitchNode {
            scrutinee,
            arms,
            location: Location::new(&doc.file, doc.line, doc.column),
        })
    }

    fn arm(&self, doc: &ArmDoc, file: &str) -> MatchlockResult<SwitchArm> {
        let pattern = match &doc.pattern {
            PatternDoc::Type { ty, binding } => Pattern::Type {
                ty: self.type_id(ty)?,
                binding: binding.clone(),
            },
            PatternDoc::Expr { expr } => Pattern::Expr(self.expr(expr)?),
            PatternDoc::Null => Pattern::Null,
            PatternDoc::Discard => Pattern::Discard,
            PatternDoc::Var { name } => Pattern::Var(name.clone()),
            PatternDoc::Tuple => Pattern::Tuple,
            PatternDoc::Property => Pattern::Property,
            PatternDoc::Relational => Pattern::Relational,
        };
        let effect = match &doc.throws {
            Some(name) => ArmEffect::Throws(self.type_id(name)?),
            None => ArmEffect::Other,
        };
        Ok(SwitchArm {
            pattern,
            has_guard: doc.guard,
            effect,
            location: Location::new(file, doc.line, doc.column),
        })
    }

    fn expr(&self, doc: &ExprDoc) -> MatchlockResult<Expr> {
        Ok(match doc {
            ExprDoc::Int { value } => Expr::IntLiteral(*value),
            ExprDoc::EnumMember { ty, member } => Expr::EnumMember {
                ty: self.type_id(ty)?,
                member: member.clone(),
            },
            ExprDoc::Const { name } => {
                let id = self
                    .const_ids
                    .get(name)
                    .copied()
                    .ok_or_else(|| self.err(format!("unknown constant '{}'", name)))?;
                Expr::ConstRef(id)
            }
            ExprDoc::Cast { target, operand } => {
                let target = match parse_integral(target) {
                    Some(it) => CastTarget::Integral(it),
                    None => CastTarget::Type(self.type_id(target)?),
                };
                Expr::Cast {
                    target,
                    operand: Box::new(self.expr(operand)?),
                }
            }
            ExprDoc::Add { lhs, rhs } => Expr::Binary {
                op: BinOp::Add,
                lhs: Box::new(self.expr(lhs)?),
                rhs: Box::new(self.expr(rhs)?),
            },
            ExprDoc::Sub { lhs, rhs } => Expr::Binary {
                op: BinOp::Sub,
                lhs: Box::new(self.expr(lhs)?),
                rhs: Box::new(self.expr(rhs)?),
            },
            ExprDoc::Opaque => Expr::Opaque,
        })
    }
}

fn parse_integral(name: &str) -> Option<IntegralType> {
    Some(match name {
        "i8" | "sbyte" => IntegralType::I8,
        "u8" | "byte" => IntegralType::U8,
        "i16" | "short" => IntegralType::I16,
        "u16" | "ushort" => IntegralType::U16,
        "i32" | "int" => IntegralType::I32,
        "u32" | "uint" => IntegralType::U32,
        "i64" | "long" => IntegralType::I64,
        "u64" | "ulong" => IntegralType::U64,
        _ => return None,
    })
}

fn parse_accessibility(name: &str) -> Option<Accessibility> {
    Some(match name {
        "public" => Accessibility::Public,
        "internal" => Accessibility::Internal,
        "protected" => Accessibility::Protected,
        "private" => Accessibility::Private,
        _ => return None,
    })
}
