use layerval::{MemoryLayers, MemoryScene, SceneSnapshot};

pub fn build(json: &str) -> (MemoryScene, MemoryLayers) {
    SceneSnapshot::from_json(json)
        .expect("snapshot JSON parses")
        .build()
        .expect("snapshot builds")
}
