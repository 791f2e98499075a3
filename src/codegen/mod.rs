//! Per-callable generation.
//!
//! `Generator::plan` validates and resolves a signature, then builds every
//! fragment as IR. Only a fully built plan is rendered, so a callable either
//! yields all five fragments or an error, never a partial result.
pub mod bind;
pub mod convert;
pub mod ir;
pub mod register;
pub mod render;
pub mod returns;

use serde::Serialize;

use crate::config::GenOptions;
use crate::descriptor::DescriptorProvider;
use crate::error::{GenError, Result};
use crate::fields::{FieldCache, FieldExtractor};
use crate::position::CallableKind;
use crate::signature::{CallableSignature, ReturnElementInfo, call_string, resolve_element, resolve_returns};

use self::bind::{BindLeaf, bind_leaves, bind_statements};
use self::ir::{Expr, Stmt};
use self::register::registration_statements;
use self::render::{render_expr, render_stmts};
use self::returns::{ExtractCtx, Extraction, extraction_statements};

/// Everything generated for one callable, still as IR.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallablePlan {
    pub name: String,
    pub kind: CallableKind,
    pub call_string: String,
    pub leaves: Vec<BindLeaf>,
    pub returns: Vec<ReturnElementInfo>,
    pub binds: Vec<Stmt>,
    pub registrations: Vec<Stmt>,
    pub extraction: Vec<Stmt>,
    pub return_expr: Option<Expr>,
}

/// The five text fragments an emitter splices into its method template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableFragments {
    pub callable: String,
    pub call_string: String,
    pub binds: String,
    pub registrations: String,
    pub extraction: String,
    pub return_expr: Option<String>,
}

impl CallablePlan {
    pub fn render(&self) -> CallableFragments {
        CallableFragments {
            callable: self.name.clone(),
            call_string: self.call_string.clone(),
            binds: render_stmts(&self.binds),
            registrations: render_stmts(&self.registrations),
            extraction: render_stmts(&self.extraction),
            return_expr: self.return_expr.as_ref().map(render_expr),
        }
    }
}

pub struct Generator<'a, P: ?Sized> {
    provider: &'a P,
    cache: &'a mut FieldCache,
    options: &'a GenOptions,
}

impl<'a, P: DescriptorProvider + ?Sized> Generator<'a, P> {
    pub fn new(provider: &'a P, cache: &'a mut FieldCache, options: &'a GenOptions) -> Self {
        Self { provider, cache, options }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(callable = %sig.name))]
    pub fn plan(&mut self, package: Option<&str>, sig: &CallableSignature) -> Result<CallablePlan, GenError> {
        self.plan_inner(package, sig).map_err(|kind| kind.in_callable(&sig.name))
    }

    pub fn generate(&mut self, package: Option<&str>, sig: &CallableSignature) -> Result<CallableFragments, GenError> {
        Ok(self.plan(package, sig)?.render())
    }

    /// Generate every callable of an enclosing unit. A failing callable does
    /// not stop its siblings.
    pub fn generate_all<'s>(
        &mut self,
        package: Option<&str>,
        callables: &'s [CallableSignature],
    ) -> Vec<(&'s CallableSignature, Result<CallableFragments, GenError>)> {
        callables
            .iter()
            .map(|sig| {
                let result = self.generate(package, sig);
                if let Err(err) = &result {
                    tracing::error!(%err, "generation failed");
                }
                (sig, result)
            })
            .collect()
    }

    fn plan_inner(&mut self, package: Option<&str>, sig: &CallableSignature) -> Result<CallablePlan> {
        let opts = self.options;
        sig.validate_cardinality()?;

        // resolve everything before emitting anything
        let mut extractor = FieldExtractor::new(self.provider, &mut *self.cache);
        let mut leaves = Vec::new();
        for param in &sig.params {
            let info = resolve_element(&mut extractor, &param.ty, &param.name)?;
            leaves.extend(bind_leaves(param, &info)?);
        }
        let returns = resolve_returns(&mut extractor, sig, &opts.position_var)?;
        tracing::debug!(leaves = leaves.len(), outputs = returns.len(), "signature resolved");

        let mut args: Vec<String> = leaves.iter().map(|leaf| leaf.arg_name.clone()).collect();
        args.extend(sig.output_args());
        let call_string = call_string(sig.kind, package, &sig.call_name(), &args);
        let binds = bind_statements(&leaves, sig.kind, opts);
        let registrations = registration_statements(&returns, sig.kind, opts);

        let mut ctx = ExtractCtx::new(opts);
        for param in &sig.params {
            ctx.reserve(&param.name);
        }
        let Extraction { statements: extraction, return_expr } = extraction_statements(&mut ctx, &returns)?;

        Ok(CallablePlan {
            name: sig.name.clone(),
            kind: sig.kind,
            call_string,
            leaves,
            returns,
            binds,
            registrations,
            extraction,
            return_expr,
        })
    }
}
