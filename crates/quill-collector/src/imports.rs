//! Pass B import resolution.
//!
//! Each file starts with an empty import table. Wildcard imports copy
//! every symbol out of the target module's table (optionally behind an
//! import-grouping symbol), single imports bind one name (optionally
//! aliased), and aggregate imports apply the single-import rule per item
//! with an optional grouping alias around the whole list.

use indexmap::IndexMap;
use tracing::debug;

use quill_ast::{Ast, Ident, ImportStmt, ImportTarget, StmtKind};
use quill_common::codes;
use quill_sema::{AliasSymbol, ImportGroupSymbol, ScopeId, Symbol, SymbolId};

use crate::collected::CollectedFile;
use crate::collector::Collector;
use crate::error::{CollectError, CollectResult};

impl Collector<'_> {
    /// Resolve every import statement recorded on `file`, filling its
    /// import table.
    pub(crate) fn resolve_imports(&mut self, ast: &Ast, file: &mut CollectedFile) {
        for &stmt_id in &file.imports.clone() {
            let StmtKind::Import(import) = &ast.stmt(stmt_id).kind else {
                continue;
            };
            if let Err(error) = self.resolve_import(import, &mut file.import_table) {
                self.record(error);
            }
        }
    }

    fn resolve_import(
        &mut self,
        import: &ImportStmt,
        table: &mut IndexMap<String, SymbolId>,
    ) -> CollectResult<()> {
        let module_scope = self.descend_module_path(&import.module_path)?;
        debug!(path = ?import.module_path.iter().map(|i| i.name.as_str()).collect::<Vec<_>>(), "resolving import");

        match &import.target {
            ImportTarget::Wildcard { group_alias } => match group_alias {
                Some(alias) => {
                    let mut inner = IndexMap::new();
                    for (name, &symbol) in self.ctx.scopes.get(module_scope).symbols() {
                        inner.insert(name.clone(), symbol);
                    }
                    let group = self.ctx.symbols.alloc(Symbol::ImportGroup(ImportGroupSymbol {
                        name: alias.name.clone(),
                        table: inner,
                    }));
                    Self::import_into(table, alias, group)
                }
                None => {
                    let copied: Vec<(String, SymbolId)> = self
                        .ctx
                        .scopes
                        .get(module_scope)
                        .symbols()
                        .iter()
                        .map(|(name, &symbol)| (name.clone(), symbol))
                        .collect();
                    for (name, symbol) in copied {
                        if let Some(&existing) = table.get(&name) {
                            if existing != symbol {
                                return Err(CollectError::new(
                                    codes::DUPLICATE_DECLARATION,
                                    format!("'{name}' is already imported"),
                                ));
                            }
                            continue;
                        }
                        table.insert(name, symbol);
                    }
                    Ok(())
                }
            },
            ImportTarget::Single { name, alias } => {
                let symbol = self.lookup_import_target(module_scope, name, &import.module_path)?;
                self.import_item(table, name, alias.as_ref(), symbol)
            }
            ImportTarget::Aggregate { items, group_alias } => match group_alias {
                Some(group_name) => {
                    let mut inner = IndexMap::new();
                    for (name, alias) in items {
                        let symbol =
                            self.lookup_import_target(module_scope, name, &import.module_path)?;
                        self.import_item(&mut inner, name, alias.as_ref(), symbol)?;
                    }
                    let group = self.ctx.symbols.alloc(Symbol::ImportGroup(ImportGroupSymbol {
                        name: group_name.name.clone(),
                        table: inner,
                    }));
                    Self::import_into(table, group_name, group)
                }
                None => {
                    for (name, alias) in items {
                        let symbol =
                            self.lookup_import_target(module_scope, name, &import.module_path)?;
                        self.import_item(table, name, alias.as_ref(), symbol)?;
                    }
                    Ok(())
                }
            },
        }
    }

    /// Insert one imported symbol, aliasing it at the import site when
    /// requested.
    fn import_item(
        &mut self,
        table: &mut IndexMap<String, SymbolId>,
        name: &Ident,
        alias: Option<&Ident>,
        symbol: SymbolId,
    ) -> CollectResult<()> {
        match alias {
            Some(alias) => {
                let aliased = self.ctx.symbols.alloc(Symbol::Alias(AliasSymbol {
                    name: alias.name.clone(),
                    target: symbol,
                }));
                Self::import_into(table, alias, aliased)
            }
            None => Self::import_into(table, name, symbol),
        }
    }

    fn import_into(
        table: &mut IndexMap<String, SymbolId>,
        name: &Ident,
        symbol: SymbolId,
    ) -> CollectResult<()> {
        if table.contains_key(&name.name) {
            return Err(CollectError::new(
                codes::DUPLICATE_DECLARATION,
                format!("'{}' is already imported", name.name),
            )
            .with_span(name.span));
        }
        table.insert(name.name.clone(), symbol);
        Ok(())
    }

    /// Descend the module scope path of an import statement.
    fn descend_module_path(&self, path: &[Ident]) -> CollectResult<ScopeId> {
        let mut current = self.ctx.global_scope;
        for segment in path {
            let found = self
                .ctx
                .scopes
                .lookup_local(current, &segment.name)
                .map(|id| self.ctx.symbols.chase_alias(id));
            match found.map(|id| (id, self.ctx.symbol(id))) {
                Some((_, Symbol::Module(module))) => current = module.scope,
                _ => {
                    return Err(CollectError::new(
                        codes::MODULE_NOT_FOUND,
                        format!("could not find a module named '{}'", segment.name),
                    )
                    .with_span(segment.span));
                }
            }
        }
        Ok(current)
    }

    fn lookup_import_target(
        &self,
        module_scope: ScopeId,
        name: &Ident,
        path: &[Ident],
    ) -> CollectResult<SymbolId> {
        self.ctx
            .scopes
            .lookup_local(module_scope, &name.name)
            .ok_or_else(|| {
                let path: Vec<&str> = path.iter().map(|i| i.name.as_str()).collect();
                CollectError::new(
                    codes::UNRESOLVED_NAME,
                    format!(
                        "could not find a symbol named '{}' in module '{}'",
                        name.name,
                        path.join(".")
                    ),
                )
                .with_span(name.span)
            })
    }
}
