//! Library Module Resolver

use crate::error::ResolveError;
use crate::session::SessionScope;
use crate::Resolver;
use futures::future::join_all;
use regimen_model::{
    ClientModuleOverride, ProgramModule, ProgramSession, ResolutionGap, Resolved, ResolvedModule,
};
use regimen_store::DocumentStore;

#[derive(Debug, Clone, Copy)]
pub struct ModuleScope<'a> {
    pub program_id: &'a str,
    pub program_module_id: &'a str,
}

/// Override tiers handed down to the module's library sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleOverrides<'a> {
    pub program: Option<&'a ProgramModule>,
    pub client: Option<&'a ClientModuleOverride>,
}

impl<'a> ModuleOverrides<'a> {
    /// Program session backed by `library_session_id`, if the program has one.
    fn program_session(&self, library_session_id: &str) -> Option<&'a ProgramSession> {
        self.program?.sessions().iter().find(|session| {
            session.library_ref() == Some(library_session_id)
                || session.key() == Some(library_session_id)
        })
    }
}

impl<S: DocumentStore> Resolver<S> {
    /// Resolves a library module and every session it references.
    ///
    /// A missing library module is fatal. A session that fails to resolve is
    /// dropped from the module and recorded as a gap.
    #[tracing::instrument(
        level = "debug",
        skip(self, scope, overrides),
        fields(program_id = %scope.program_id, program_module_id = %scope.program_module_id)
    )]
    pub async fn resolve_library_module(
        &self,
        creator_id: &str,
        library_module_ref: &str,
        scope: ModuleScope<'_>,
        overrides: ModuleOverrides<'_>,
    ) -> Result<Resolved<ResolvedModule>, ResolveError> {
        let library = self
            .fetch_library_module(creator_id, library_module_ref)
            .await?
            .require(|module_id| ResolveError::ModuleNotFound {
                creator_id: creator_id.to_string(),
                module_id,
            })?;

        tracing::debug!(
            module_id = %library.id,
            sessions = library.session_refs.len(),
            "resolving library sessions"
        );

        let sessions = join_all(library.session_refs.iter().map(|session_ref| {
            let program_session = overrides.program_session(session_ref);
            let session_scope = SessionScope {
                program_id: scope.program_id,
                program_module_id: scope.program_module_id,
                program_session_id: program_session
                    .and_then(ProgramSession::key)
                    .unwrap_or(session_ref.as_str()),
            };
            self.resolve_library_session(
                creator_id,
                session_ref,
                session_scope,
                program_session.and_then(|session| session.overrides.as_ref()),
                overrides.client.and_then(|client| client.session(session_ref)),
            )
        }))
        .await;

        let mut resolved = Resolved::complete(Vec::with_capacity(sessions.len()));
        for (index, (session_ref, session)) in library.session_refs.iter().zip(sessions).enumerate() {
            match session {
                Ok(session) => {
                    let mut session = resolved.absorb(session);
                    session.order = Some(index as i64);
                    session.library_session_ref = Some(session_ref.clone());
                    resolved.value.push(session);
                }
                Err(error) => {
                    let path = self
                        .layout
                        .library_session(creator_id, session_ref)
                        .map(|path| path.to_string())
                        .unwrap_or_else(|_| session_ref.clone());
                    tracing::warn!(
                        module_id = %library.id,
                        session_id = %session_ref,
                        error = %error,
                        "dropping unresolvable library session"
                    );
                    resolved.push_gap(ResolutionGap::SessionDropped {
                        path,
                        library_module_id: library.id.clone(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        Ok(resolved.map(|sessions| ResolvedModule {
            id: library.id,
            library_module_ref: None,
            title: library.title,
            order: library.order,
            version: Some(library.version),
            sessions,
            extra: library.extra,
        }))
    }
}
