//! Topic prompts: interactive stdin, or a topic fixed on the command line.

use async_trait::async_trait;
use coordination::{CollaboratorError, TopicPrompt};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;

const WELCOME: &str = "Welcome to the Historical Moot Court.\n\
The Admirer and the Critic will research your defendant, the Judge will weigh \
the evidence, and the Scribe will record the verdict.\n";
const QUESTION: &str = "Which historical figure or event do you want to put on trial? ";

/// Asks on stdout, reads one line from stdin per attempt.
pub struct StdinTopicPrompt {
    lines: Mutex<Lines<BufReader<Stdin>>>,
    greeted: Mutex<bool>,
}

impl StdinTopicPrompt {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
            greeted: Mutex::new(false),
        }
    }
}

impl Default for StdinTopicPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TopicPrompt for StdinTopicPrompt {
    async fn prompt_topic(&self) -> Result<String, CollaboratorError> {
        let mut out = tokio::io::stdout();
        {
            let mut greeted = self.greeted.lock().await;
            if !*greeted {
                out.write_all(WELCOME.as_bytes()).await?;
                *greeted = true;
            }
        }
        out.write_all(QUESTION.as_bytes()).await?;
        out.flush().await?;

        match self.lines.lock().await.next_line().await? {
            Some(line) => Ok(line),
            None => Err(CollaboratorError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "stdin closed before a topic was entered",
            ))),
        }
    }
}

/// A topic supplied up front (e.g. `--topic`).
#[derive(Debug, Clone)]
pub struct FixedTopic(pub String);

#[async_trait]
impl TopicPrompt for FixedTopic {
    async fn prompt_topic(&self) -> Result<String, CollaboratorError> {
        Ok(self.0.clone())
    }
}
