//! Result extraction: one shape handler per declared output, then aggregation.
//!
//! Outputs are processed in reverse declaration order, each at the position
//! resolved for it (`idx`, `idx - 1`, …). Row-based handlers share one row
//! builder; they only differ in what they do with each rebuilt row:
//! overwrite (last row wins), wrap in an optional, or append to a list.
use indexmap::IndexMap;

use crate::classify::{Shape, classify};
use crate::config::GenOptions;
use crate::descriptor::{ClassKind, FieldDescriptor, TypeDescriptor};
use crate::error::{GenErrorKind, Result};
use crate::fields::{ClassFields, NestedFieldIndex};
use crate::naming::{capitalize, local_ident, snake_case};
use crate::signature::{ParentAggregate, ReturnElementInfo};

use super::convert::read_value;
use super::ir::{Expr, Stmt};

// ------------------------------- Context --------------------------------- //

/// Per-callable emission state: options plus the locals already taken.
pub struct ExtractCtx<'o> {
    pub opts: &'o GenOptions,
    taken: IndexMap<String, usize>,
}

/// Extraction statements plus the expression the method returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub statements: Vec<Stmt>,
    pub return_expr: Option<Expr>,
}

impl<'o> ExtractCtx<'o> {
    pub fn new(opts: &'o GenOptions) -> Self {
        let mut ctx = Self { opts, taken: IndexMap::new() };
        ctx.reserve(&opts.statement_var);
        ctx.reserve(&opts.position_var);
        ctx
    }

    /// Mark a name as used by the surrounding method, e.g. a parameter.
    pub fn reserve(&mut self, name: &str) {
        self.taken.entry(name.to_string()).or_insert(1);
    }

    /// `base`, or `base1`, `base2`, … if already taken.
    pub fn fresh(&mut self, base: &str) -> String {
        let mut n = self.taken.get(base).copied().unwrap_or(0);
        loop {
            let candidate = if n == 0 { base.to_string() } else { format!("{base}{n}") };
            n += 1;
            if !self.taken.contains_key(&candidate) {
                self.taken.insert(base.to_string(), n);
                self.taken.insert(candidate.clone(), 1);
                return candidate;
            }
        }
    }

    fn statement(&self) -> Expr {
        Expr::var(&self.opts.statement_var)
    }

    fn conversions(&self) -> &str {
        &self.opts.conversions_class
    }

    // ---- row builder ----

    /// Rebuild one instance of `class` from the current row. Beans get a local
    /// and one setter call per field; records become a constructor expression.
    fn build_value(
        &mut self,
        class: &ClassFields,
        index: &NestedFieldIndex,
        cursor: &str,
        column_prefix: Option<&str>,
        var_base: &str,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        let ty = class.class.simple_name().to_string();
        match class.kind {
            ClassKind::Bean => {
                let var = self.fresh(var_base);
                out.push(Stmt::declare(&ty, &var, Expr::new_instance(&ty, Vec::new())));
                for field in &class.fields {
                    if field.setter.is_none() && !field.public {
                        tracing::warn!(class = %class.class, field = %field.name, "no setter and not public, left unset");
                        continue;
                    }
                    let value = self.field_value(field, index, cursor, column_prefix, &var, out)?;
                    match &field.setter {
                        Some(setter) => out.push(Stmt::call(Expr::var(&var), setter, vec![value])),
                        None => out.push(Stmt::assign(format!("{var}.{}", field.name), value)),
                    }
                }
                Ok(Expr::var(var))
            }
            ClassKind::Record => {
                let args = class
                    .fields
                    .iter()
                    .map(|field| self.field_value(field, index, cursor, column_prefix, var_base, out))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::new_instance(ty, args))
            }
        }
    }

    fn field_value(
        &mut self,
        field: &FieldDescriptor,
        index: &NestedFieldIndex,
        cursor: &str,
        column_prefix: Option<&str>,
        owner: &str,
        out: &mut Vec<Stmt>,
    ) -> Result<Expr> {
        let column = match column_prefix {
            Some(prefix) => format!("{prefix}_{}", snake_case(&field.name)),
            None => snake_case(&field.name),
        };
        let nested_base = format!("{owner}{}", capitalize(&field.name));
        match classify(&field.ty)? {
            Shape::Scalar => {
                let kind = scalar_kind(&field.ty)?;
                Ok(read_value(kind, Expr::var(cursor), Expr::Str(column), self.conversions()))
            }
            Shape::OptionalScalar => {
                let kind = scalar_kind(wrapped(&field.ty)?)?;
                let read = read_value(kind, Expr::var(cursor), Expr::Str(column), self.conversions());
                Ok(Expr::static_call("Optional", "ofNullable", vec![read]))
            }
            Shape::Composed => {
                let nested = nested_fields(index, &field.ty)?;
                self.build_value(&nested, index, cursor, Some(&column), &nested_base, out)
            }
            Shape::OptionalComposed => {
                let nested = nested_fields(index, wrapped(&field.ty)?)?;
                let value = self.build_value(&nested, index, cursor, Some(&column), &nested_base, out)?;
                Ok(Expr::static_call("Optional", "ofNullable", vec![value]))
            }
            Shape::CollectionOfComposed => Err(GenErrorKind::unsupported(
                field.ty.name(),
                format!("collection field `{}` cannot be read from a single row", field.name),
            )),
        }
    }

    /// Shared loop for the row-based handlers.
    fn row_loop(
        &mut self,
        element: &ReturnElementInfo,
        local: &str,
        declared_ty: String,
        init: Expr,
        on_row: impl FnOnce(&str, Expr) -> Stmt,
    ) -> Result<Vec<Stmt>> {
        let fields = element
            .composed
            .fields
            .as_ref()
            .ok_or_else(|| GenErrorKind::UnknownType { ty: element.ty().to_string() })?;
        let opts = self.opts;
        let cursor = self.fresh(&opts.cursor_var);

        let mut body = Vec::new();
        let row = self.build_value(fields, &element.composed.nested, &cursor, None, "row", &mut body)?;
        body.push(on_row(local, row));

        let source = Expr::cast(
            "ResultSet",
            Expr::call(self.statement(), "getObject", vec![Expr::Position(element.position.clone())]),
        );
        Ok(vec![
            Stmt::declare(declared_ty, local, init),
            Stmt::CursorLoop { cursor, source, body },
        ])
    }
}

fn scalar_kind(ty: &TypeDescriptor) -> Result<crate::scalar::ScalarKind> {
    ty.scalar_kind()
        .ok_or_else(|| GenErrorKind::unsupported(ty.name(), "expected a scalar"))
}

fn wrapped(ty: &TypeDescriptor) -> Result<&TypeDescriptor> {
    ty.wrapped()
        .ok_or_else(|| GenErrorKind::unsupported(ty.name(), "expected a wrapped type"))
}

fn nested_fields(index: &NestedFieldIndex, ty: &TypeDescriptor) -> Result<std::rc::Rc<ClassFields>> {
    index
        .get(ty.raw())
        .cloned()
        .ok_or_else(|| GenErrorKind::UnknownType { ty: ty.raw().to_string() })
}

// ------------------------------- Handlers -------------------------------- //

pub trait ShapeHandler {
    /// Statements that leave the output's value in `local`.
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>>;
}

/// One typed read at the output's position.
pub struct ScalarHandler;
/// Rows overwrite the target; no rows leaves `null`.
pub struct ComposedHandler;
pub struct OptionalScalarHandler;
/// As [`ComposedHandler`], wrapped; no rows leaves `Optional.empty()`.
pub struct OptionalComposedHandler;
/// Every row is appended to a fresh list.
pub struct CollectionHandler;

pub fn handler_for(shape: Shape) -> &'static dyn ShapeHandler {
    match shape {
        Shape::Scalar => &ScalarHandler,
        Shape::Composed => &ComposedHandler,
        Shape::OptionalScalar => &OptionalScalarHandler,
        Shape::OptionalComposed => &OptionalComposedHandler,
        Shape::CollectionOfComposed => &CollectionHandler,
    }
}

impl ShapeHandler for ScalarHandler {
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>> {
        let kind = scalar_kind(element.ty())?;
        let read = read_value(
            kind,
            ctx.statement(),
            Expr::Position(element.position.clone()),
            ctx.conversions(),
        );
        Ok(vec![Stmt::declare(kind.java_type(), local, read)])
    }
}

impl ShapeHandler for OptionalScalarHandler {
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>> {
        let kind = scalar_kind(wrapped(element.ty())?)?;
        let read = read_value(
            kind,
            ctx.statement(),
            Expr::Position(element.position.clone()),
            ctx.conversions(),
        );
        Ok(vec![Stmt::declare(
            element.ty().java_type(),
            local,
            Expr::static_call("Optional", "ofNullable", vec![read]),
        )])
    }
}

impl ShapeHandler for ComposedHandler {
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>> {
        // Multi-row results keep the last row.
        ctx.row_loop(element, local, element.ty().java_type(), Expr::null(), |local, row| {
            Stmt::assign(local, row)
        })
    }
}

impl ShapeHandler for OptionalComposedHandler {
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>> {
        let empty = Expr::static_call("Optional", "empty", Vec::new());
        ctx.row_loop(element, local, element.ty().java_type(), empty, |local, row| {
            Stmt::assign(local, Expr::static_call("Optional", "of", vec![row]))
        })
    }
}

impl ShapeHandler for CollectionHandler {
    fn extract(&self, ctx: &mut ExtractCtx<'_>, element: &ReturnElementInfo, local: &str) -> Result<Vec<Stmt>> {
        let implementation = match element.ty().raw().simple_name() {
            "Set" => "LinkedHashSet<>",
            _ => "ArrayList<>",
        };
        let init = Expr::new_instance(implementation, Vec::new());
        ctx.row_loop(element, local, element.ty().java_type(), init, |local, row| {
            Stmt::call(Expr::var(local), "add", vec![row])
        })
    }
}

// ------------------------------ Aggregation ------------------------------ //

/// Build the parent aggregate `var` from the per-output `locals` (one per
/// element, same order), in the parent's field declaration order.
pub fn aggregate(
    parent: &ParentAggregate,
    elements: &[ReturnElementInfo],
    locals: &[String],
    var: &str,
) -> Result<Vec<Stmt>> {
    let ty = parent.element.ty.java_type();
    let by_target: IndexMap<&str, &str> = elements
        .iter()
        .zip(locals)
        .filter_map(|(e, local)| Some((e.target.as_deref()?, local.as_str())))
        .collect();

    match parent.fields.kind {
        ClassKind::Record => {
            let args = parent
                .fields
                .fields
                .iter()
                .map(|field| match by_target.get(field.name.as_str()) {
                    Some(local) => Expr::var(*local),
                    None => Expr::null(),
                })
                .collect();
            Ok(vec![Stmt::declare(&ty, var, Expr::new_instance(&ty, args))])
        }
        ClassKind::Bean => {
            let mut out = vec![Stmt::declare(&ty, var, Expr::new_instance(&ty, Vec::new()))];
            for field in &parent.fields.fields {
                let Some(&local) = by_target.get(field.name.as_str()) else { continue };
                match (&field.setter, field.public) {
                    (Some(setter), _) => out.push(Stmt::call(Expr::var(var), setter, vec![Expr::var(local)])),
                    (None, true) => out.push(Stmt::assign(format!("{var}.{}", field.name), Expr::var(local))),
                    (None, false) => {
                        return Err(GenErrorKind::unsupported(
                            parent.element.ty.name(),
                            format!("field `{}` has no setter to receive output `{local}`", field.name),
                        ));
                    }
                }
            }
            Ok(out)
        }
    }
}

/// All extraction statements, outputs in reverse declaration order, followed
/// by the aggregation when the outputs share a parent. Every local is fresh
/// against the names `ctx` already holds.
pub fn extraction_statements(ctx: &mut ExtractCtx<'_>, elements: &[ReturnElementInfo]) -> Result<Extraction> {
    let locals: Vec<String> = elements
        .iter()
        .map(|e| ctx.fresh(&local_ident(&e.output_name)))
        .collect();
    let parent = elements.first().and_then(|e| e.parent.as_deref());
    let opts = ctx.opts;
    let aggregate_var = parent.map(|_| ctx.fresh(&opts.aggregate_var));

    let mut statements = Vec::new();
    for (element, local) in elements.iter().zip(&locals).rev() {
        statements.extend(handler_for(element.shape()).extract(ctx, element, local)?);
    }
    if let (Some(parent), Some(var)) = (parent, aggregate_var.as_deref()) {
        statements.extend(aggregate(parent, elements, &locals, var)?);
    }
    let return_expr = return_expression(&locals, aggregate_var.as_deref());
    Ok(Extraction { statements, return_expr })
}

/// Expression the generated method returns, if any: the aggregate when there
/// is one, otherwise the single output's local.
pub fn return_expression(locals: &[String], aggregate_var: Option<&str>) -> Option<Expr> {
    match (aggregate_var, locals) {
        (Some(var), _) => Some(Expr::var(var)),
        (None, [single]) => Some(Expr::var(single)),
        (None, _) => None,
    }
}
