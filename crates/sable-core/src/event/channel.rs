// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// A generic, thread-safe event queue backed by an unbounded MPSC channel.
///
/// The channel is generic over the type `T` it transports, which keeps `sable-core`
/// decoupled from the concrete event types defined in higher-level crates. Producers
/// hold a cloned [`flume::Sender`]; the owner of the channel drains it at a point of
/// its choosing.
#[derive(Debug)]
pub struct EventChannel<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventChannel<T> {
    /// Creates a new channel with an unbounded queue.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::trace!("EventChannel<{}> initialized.", std::any::type_name::<T>());
        Self { sender, receiver }
    }

    /// Pushes a value, logging an error if the receiving side is gone.
    pub fn publish(&self, value: T) {
        if let Err(e) = self.sender.send(value) {
            log::error!("Failed to send event: {e}. Receiver likely disconnected.");
        }
    }

    /// Returns a clone of the sender end of the channel.
    /// Use this to allow other parts of the engine to push values.
    pub fn sender(&self) -> flume::Sender<T> {
        self.sender.clone()
    }

    /// Returns a reference to the receiver end of the channel.
    pub fn receiver(&self) -> &flume::Receiver<T> {
        &self.receiver
    }

    /// Takes every value currently queued, in arrival order, without blocking.
    pub fn drain(&self) -> Vec<T> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of values waiting in the queue.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if nothing is waiting in the queue.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

impl<T: Send + 'static> Default for EventChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flume::TryRecvError;
    use std::{thread, time::Duration};

    #[derive(Debug, Clone, PartialEq)]
    enum TestInput {
        KeyPressed(u32),
        CloseRequested,
    }

    #[test]
    fn new_channel_is_empty() {
        let channel = EventChannel::<TestInput>::new();
        assert!(channel.is_empty());
        assert_eq!(channel.receiver().try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn drain_preserves_arrival_order() {
        let channel = EventChannel::new();
        channel.publish(TestInput::KeyPressed(1));
        channel.publish(TestInput::KeyPressed(2));
        channel.sender().send(TestInput::CloseRequested).unwrap();

        assert_eq!(channel.len(), 3);
        assert_eq!(
            channel.drain(),
            vec![
                TestInput::KeyPressed(1),
                TestInput::KeyPressed(2),
                TestInput::CloseRequested
            ]
        );
        assert!(channel.is_empty());
        assert!(channel.drain().is_empty());
    }

    #[test]
    fn send_from_thread() {
        let channel = EventChannel::new();
        let sender = channel.sender();

        let handle = thread::spawn(move || {
            sender
                .send(TestInput::KeyPressed(32))
                .expect("Send from thread failed");
        });
        handle.join().expect("Thread join failed");

        match channel.receiver().recv_timeout(Duration::from_secs(1)) {
            Ok(received) => assert_eq!(received, TestInput::KeyPressed(32)),
            Err(e) => panic!("Failed to receive value from thread: {e:?}"),
        }
    }
}
