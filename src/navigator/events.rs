//! Navigation requests carried over the event channel.

use super::builder::ScreenBuilder;
use crate::channel::{ChannelClosed, EventSender};
use std::fmt;

/// A push or pop queued for the navigator's consumer loop.
pub enum NavigationRequest {
    Push(PushRequest),
    Pop(PopRequest),
}

impl fmt::Debug for NavigationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(request) => f.debug_tuple("Push").field(request).finish(),
            Self::Pop(request) => f.debug_tuple("Pop").field(request).finish(),
        }
    }
}

/// Push the entry produced by `builder`.
pub struct PushRequest {
    pub builder: Box<dyn ScreenBuilder>,
}

impl PushRequest {
    pub fn new(builder: impl ScreenBuilder) -> Self {
        Self {
            builder: Box::new(builder),
        }
    }
}

impl fmt::Debug for PushRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushRequest")
            .field("play_animation", &self.builder.play_animation())
            .field("retain_in_history", &self.builder.retain_in_history())
            .finish_non_exhaustive()
    }
}

/// Pop the top entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopRequest {
    pub play_animation: bool,
}

impl EventSender<NavigationRequest> {
    /// Queue a push. Fails once the navigator has shut down.
    pub fn send_push(
        &self,
        builder: impl ScreenBuilder,
    ) -> Result<(), ChannelClosed<NavigationRequest>> {
        self.send(NavigationRequest::Push(PushRequest::new(builder)))
    }

    /// Queue a pop of whatever is on top when the request is consumed.
    pub fn send_pop(&self, play_animation: bool) -> Result<(), ChannelClosed<NavigationRequest>> {
        self.send(NavigationRequest::Pop(PopRequest { play_animation }))
    }
}
