//! Form collaborators backed by the console's event channel

use super::events::Event;
use super::forms::NameCheckSink;
use ccr_core::{CcrError, FatalErrorReporter, FieldValues, FollowerIndexSaver, Navigator};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

/// Turns form callbacks into [`Event`]s handled by the app loop.
#[derive(Debug, Clone)]
pub struct ChannelServices {
    sender: UnboundedSender<Event>,
}

impl ChannelServices {
    pub fn new(sender: UnboundedSender<Event>) -> Self {
        Self { sender }
    }

    fn send(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("console event loop has shut down, dropping event");
        }
    }

    pub fn name_check_sink(&self) -> NameCheckSink {
        let sender = self.sender.clone();
        Arc::new(move |result| {
            if sender.send(Event::NameChecked(result)).is_err() {
                warn!("console event loop has shut down, dropping name check");
            }
        })
    }
}

impl FollowerIndexSaver for ChannelServices {
    fn save_follower_index(&self, name: &str, fields: FieldValues) {
        self.send(Event::SaveRequested {
            name: name.to_string(),
            fields,
        });
    }

    fn clear_api_error(&self) {
        self.send(Event::ClearApiError);
    }
}

impl Navigator for ChannelServices {
    fn navigate(&self, path: &str) {
        self.send(Event::Navigate(path.to_string()));
    }
}

impl FatalErrorReporter for ChannelServices {
    fn report_fatal(&self, error: &CcrError, title: &str) {
        self.send(Event::Fatal {
            title: title.to_string(),
            message: error.to_string(),
        });
    }
}
