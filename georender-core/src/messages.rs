use crate::{GeoreferencedMap, Point};
use serde::{Deserialize, Serialize};

/// Messages sent from main thread to the render worker.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum MainToWorker {
    /// Create the render surface and engine.
    Initialize { width: u32, height: u32 },

    /// Register a map with the engine.
    AddGeoreferencedMap { map: GeoreferencedMap },

    /// Render a circular region around `center` (lon, lat) with `radius` in meters.
    Render {
        center: Point,
        width: u32,
        height: u32,
        radius: f64,
    },
}

/// A request plus the id its reply will carry.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WorkerRequest {
    pub id: u32,
    #[serde(flatten)]
    pub message: MainToWorker,
}

/// Messages sent from the render worker to main thread.
///
/// `Rendered` announces pixels; the buffer itself travels beside the
/// message as a transferred object and is never serialized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum WorkerToMain {
    /// Worker is loaded and accepting requests.
    Ready,

    Initialized { id: u32 },

    MapAdded { id: u32 },

    Rendered { id: u32, width: u32, height: u32 },

    /// Request failed. id is None when the request could not be decoded.
    Error { id: Option<u32>, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_request_flattens_type_next_to_id() {
        let request = WorkerRequest {
            id: 7,
            message: MainToWorker::Render {
                center: Point::new(4.9, 52.37),
                width: 256,
                height: 128,
                radius: 1000.0,
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains(r#""id":7"#));
        assert!(json.contains(r#""type":"Render""#));
        assert!(json.contains(r#""center":[4.9,52.37]"#));
    }

    #[test]
    fn initialize_request_parses_from_plain_json() {
        let json = r#"{"id":1,"type":"Initialize","width":256,"height":256}"#;
        let request: WorkerRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id, 1);
        match request.message {
            MainToWorker::Initialize { width, height } => {
                assert_eq!(width, 256);
                assert_eq!(height, 256);
            }
            _ => panic!("Wrong variant"),
        }
    }

    #[test]
    fn unknown_request_type_is_rejected() {
        let json = r#"{"id":1,"type":"Teardown"}"#;
        assert!(serde_json::from_str::<WorkerRequest>(json).is_err());
    }

    #[test]
    fn ready_message_serialization() {
        let json = serde_json::to_string(&WorkerToMain::Ready).unwrap();
        assert_eq!(json, r#"{"type":"Ready"}"#);
    }

    #[test]
    fn error_reply_keeps_message() {
        let msg = WorkerToMain::Error {
            id: Some(3),
            message: "Renderer not initialized".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: WorkerToMain = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
