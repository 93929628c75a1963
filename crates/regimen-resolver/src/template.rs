//! Program template loader
//!
//! Reads `courses/{program}` and fills in whatever the document does not
//! inline: the `modules` sub-collection, each module's `sessions`
//! sub-collection, and the exercises and sets of standalone sessions.

use crate::error::ResolveError;
use crate::Resolver;
use futures::future::try_join_all;
use regimen_model::{ProgramModule, ProgramSession, ProgramTemplate, Resolved};
use regimen_store::{Document, DocumentStore};

impl<S: DocumentStore> Resolver<S> {
    /// `Ok(None)` when the program document does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn load_program_template(
        &self,
        program_id: &str,
    ) -> Result<Option<Resolved<ProgramTemplate>>, ResolveError> {
        let path = self.layout.program(program_id)?;
        let Some(doc) = self.store.get_doc(&path).await? else {
            return Ok(None);
        };
        let mut template: ProgramTemplate = doc.decode()?;

        if doc.field("modules").is_none() {
            let modules_path = self.layout.program_modules(program_id)?;
            template.modules = self
                .store
                .get_ordered_collection(&modules_path, &self.config.order_field)
                .await?
                .iter()
                .map(Document::decode::<ProgramModule>)
                .collect::<Result<_, _>>()?;
        }
        tracing::debug!(modules = template.modules.len(), "loaded program modules");

        let modules = std::mem::take(&mut template.modules);
        let loaded = try_join_all(
            modules
                .into_iter()
                .map(|module| self.load_program_module(program_id, module)),
        )
        .await?;

        let mut resolved = Resolved::complete(());
        template.modules = loaded
            .into_iter()
            .map(|module| resolved.absorb(module))
            .collect();
        Ok(Some(resolved.map(|()| template)))
    }

    async fn load_program_module(
        &self,
        program_id: &str,
        mut module: ProgramModule,
    ) -> Result<Resolved<ProgramModule>, ResolveError> {
        let sessions = match module.sessions.take() {
            Some(sessions) => sessions,
            None => {
                let sessions_path = self.layout.program_sessions(program_id, &module.id)?;
                self.store
                    .get_ordered_collection(&sessions_path, &self.config.order_field)
                    .await?
                    .iter()
                    .map(Document::decode::<ProgramSession>)
                    .collect::<Result<_, _>>()?
            }
        };

        let loaded = try_join_all(
            sessions
                .into_iter()
                .map(|session| self.load_standalone_exercises(program_id, &module.id, session)),
        )
        .await?;

        let mut resolved = Resolved::complete(());
        module.sessions = Some(
            loaded
                .into_iter()
                .map(|session| resolved.absorb(session))
                .collect(),
        );
        Ok(resolved.map(|()| module))
    }

    /// Standalone sessions keep their exercises under the program session
    /// document. Library-backed sessions and sessions with inline exercises
    /// are returned as they are.
    async fn load_standalone_exercises(
        &self,
        program_id: &str,
        module_id: &str,
        mut session: ProgramSession,
    ) -> Result<Resolved<ProgramSession>, ResolveError> {
        let Some(session_id) = session.id.as_deref().filter(|id| !id.is_empty()) else {
            return Ok(Resolved::complete(session));
        };
        if session.library_ref().is_some() || session.exercises.is_some() {
            return Ok(Resolved::complete(session));
        }

        let session_path = self
            .layout
            .program_session(program_id, module_id, session_id)?;
        let exercises_path = self.layout.exercises_of(&session_path)?;
        let mut exercises = self.fetch_exercises(&exercises_path).await?;
        session.exercises = Some(std::mem::take(&mut exercises.value));
        Ok(exercises.map(|_| session))
    }
}
