//! Client Program Resolver

use crate::error::ResolveError;
use crate::merge::{merge_module_overrides, merge_program_overrides, program_to_resolved};
use crate::module::{ModuleOverrides, ModuleScope};
use crate::Resolver;
use futures::future::try_join_all;
use regimen_model::{
    ClientProgramOverrides, ProgramModule, ProgramTemplate, ResolutionGap, Resolved,
    ResolvedModule, ResolvedProgram,
};
use regimen_store::{DocumentStore, StoreError};

impl<S: DocumentStore> Resolver<S> {
    /// Resolves a program template for one user: every library-backed module
    /// is expanded from the creator's library, then program and client
    /// overrides are layered on top.
    ///
    /// An unreadable client override document, a template without a creator
    /// id, and dropped sessions or sets only produce gaps. A missing library
    /// module or a failed module fetch fails the whole resolution.
    #[tracing::instrument(skip(self, template), fields(creator_id = ?template.creator_id))]
    pub async fn resolve_client_program(
        &self,
        user_id: &str,
        program_id: &str,
        template: ProgramTemplate,
    ) -> Result<Resolved<ResolvedProgram>, ResolveError> {
        let mut resolved = Resolved::complete(());
        let client = resolved.absorb(self.load_client_overrides(user_id, program_id).await);

        let Some(creator_id) = template.creator() else {
            tracing::warn!(
                program_id = %program_id,
                "program has no creator id, skipping library resolution"
            );
            let path = self
                .layout
                .program(program_id)
                .map(|path| path.to_string())
                .unwrap_or_else(|_| program_id.to_string());
            resolved.push_gap(ResolutionGap::LibraryResolutionSkipped { path });
            let mut program = merge_program_overrides(&template, client.as_ref());
            fill_program_id(&mut program.id, program_id);
            return Ok(resolved.map(|()| program));
        };

        tracing::debug!(modules = template.modules.len(), "resolving program modules");
        let modules = try_join_all(template.modules.iter().map(|module| {
            self.resolve_program_module(creator_id, program_id, module, client.as_ref())
        }))
        .await?;

        let modules: Vec<ResolvedModule> = modules
            .into_iter()
            .map(|module| resolved.absorb(module))
            .collect();

        let mut program = program_to_resolved(&template, modules);
        fill_program_id(&mut program.id, program_id);

        tracing::info!(
            program_id = %program_id,
            modules = program.modules.len(),
            gaps = resolved.gaps.len(),
            "resolved client program"
        );
        Ok(resolved.map(|()| program))
    }

    async fn resolve_program_module(
        &self,
        creator_id: &str,
        program_id: &str,
        module: &ProgramModule,
        client: Option<&ClientProgramOverrides>,
    ) -> Result<Resolved<ResolvedModule>, ResolveError> {
        let client_module = client.and_then(|c| c.module(&module.id));

        let Some(library_ref) = module.library_ref() else {
            return Ok(Resolved::complete(merge_module_overrides(
                None,
                module,
                client_module,
            )));
        };

        let library = self
            .resolve_library_module(
                creator_id,
                library_ref,
                ModuleScope {
                    program_id,
                    program_module_id: &module.id,
                },
                ModuleOverrides {
                    program: Some(module),
                    client: client_module,
                },
            )
            .await?;
        Ok(library.map(|library| merge_module_overrides(Some(library), module, client_module)))
    }

    /// `client_programs/{user}_{program}`. Absent, unreadable and malformed
    /// documents all mean "no client overrides".
    async fn load_client_overrides(
        &self,
        user_id: &str,
        program_id: &str,
    ) -> Resolved<Option<ClientProgramOverrides>> {
        let path = match self.layout.client_program(user_id, program_id) {
            Ok(path) => path,
            Err(error) => {
                return client_gap(&format!("{user_id}_{program_id}"), program_id, error)
            }
        };
        let read = match self.store.get_doc(&path).await {
            Ok(Some(doc)) => doc.decode::<ClientProgramOverrides>().map(Some),
            Ok(None) => Ok(None),
            Err(error) => Err(error),
        };
        match read {
            Ok(overrides) => Resolved::complete(overrides),
            Err(error) => client_gap(&path.to_string(), program_id, error),
        }
    }
}

fn client_gap(
    path: &str,
    program_id: &str,
    error: StoreError,
) -> Resolved<Option<ClientProgramOverrides>> {
    tracing::warn!(
        path = %path,
        program_id = %program_id,
        error = %error,
        "client overrides unavailable, resolving without them"
    );
    Resolved::with_gaps(
        None,
        vec![ResolutionGap::ClientOverridesUnavailable {
            path: path.to_string(),
            reason: error.to_string(),
        }],
    )
}

fn fill_program_id(id: &mut String, program_id: &str) {
    if id.is_empty() {
        *id = program_id.to_string();
    }
}
