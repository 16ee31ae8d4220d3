//! End-to-end controller flows over real file-backed storage.

use async_trait::async_trait;
use std::fs::File;
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use webllama_application::{PreviewWriter, WebsiteBuilder};
use webllama_core::{FileKind, GenerationAgent, GenerationRequest, PromptVariant};
use webllama_infrastructure::FileKeyValueStorage;
use zip::ZipArchive;

const RESPONSE: &str = "<!-- HTML_START -->\n<h1>Bakery</h1>\n<!-- HTML_END -->\n<!-- CSS_START -->\nh1{color:peru}\n<!-- CSS_END -->\n<!-- JS_START -->\nconsole.log('hi');\n<!-- JS_END -->";

/// Agent double that echoes a canned response, or the user prompt
/// uppercased for the enhance variant.
struct CannedAgent;

#[async_trait]
impl GenerationAgent for CannedAgent {
    async fn complete(
        &self,
        request: &GenerationRequest,
        _cancel: CancellationToken,
    ) -> webllama_core::Result<String> {
        match request.variant {
            PromptVariant::Generate => Ok(RESPONSE.to_string()),
            PromptVariant::Enhance => Ok(format!("{} with warm colors", request.prompt)),
        }
    }
}

fn builder_over(dir: &TempDir, subdir: &str) -> Arc<WebsiteBuilder> {
    let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
    let storage = Arc::new(FileKeyValueStorage::new(dir.path().join("state")));
    let preview = PreviewWriter::new(dir.path().join(subdir));
    Arc::new(WebsiteBuilder::new(
        Arc::new(CannedAgent),
        storage,
        preview,
        "sk-or-v1-test",
        "model-x",
        tx,
    ))
}

#[tokio::test]
async fn test_generate_edit_and_resume_across_controllers() {
    let dir = TempDir::new().unwrap();

    // First session: generate, then hand-edit the stylesheet.
    let builder = builder_over(&dir, "previews-a");
    builder.generate("landing page for a bakery").await;
    assert_eq!(builder.files().html, "<h1>Bakery</h1>");

    builder.edit_buffer(FileKind::Css, "h1{color:chocolate}");
    drop(builder);

    // Second session over the same storage: the edit survives.
    let resumed = builder_over(&dir, "previews-b");
    assert!(resumed.restore_session());
    assert_eq!(resumed.current_prompt(), "landing page for a bakery");
    assert_eq!(resumed.files().css, "h1{color:chocolate}");
    assert_eq!(resumed.files().js, "console.log('hi');");

    // History persisted too.
    let history = resumed.history_entries();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].files.css, "h1{color:peru}");
}

#[tokio::test]
async fn test_generate_then_export_archive() {
    let dir = TempDir::new().unwrap();
    let builder = builder_over(&dir, "previews");

    builder.generate("landing page for a bakery").await;

    let out = dir.path().join("out");
    let path = builder.export_as_archive(Some(out)).await.unwrap();

    let archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
    let names: Vec<_> = archive.file_names().collect();
    assert!(names.contains(&"index.html"));
    assert!(names.contains(&"style.css"));
    assert!(names.contains(&"script.js"));
    assert!(names.contains(&"README.md"));
}

#[tokio::test]
async fn test_enhance_then_generate_flow() {
    let dir = TempDir::new().unwrap();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let storage = Arc::new(FileKeyValueStorage::new(dir.path().join("state")));
    let builder = WebsiteBuilder::new(
        Arc::new(CannedAgent),
        storage,
        PreviewWriter::new(dir.path().join("previews")),
        "sk-or-v1-test",
        "model-x",
        tx,
    );

    builder.enhance_prompt("a bakery").await;

    // The enhanced prompt arrives as an event for the front end to adopt.
    let mut enhanced = None;
    while let Ok(event) = rx.try_recv() {
        if let webllama_core::BuilderEvent::PromptReplaced { prompt } = event {
            enhanced = Some(prompt);
        }
    }
    let enhanced = enhanced.expect("Should publish the enhanced prompt");
    assert_eq!(enhanced, "a bakery with warm colors");

    builder.generate(&enhanced).await;
    assert_eq!(builder.current_prompt(), "a bakery with warm colors");
    assert_eq!(builder.history_entries()[0].prompt, enhanced);
}
