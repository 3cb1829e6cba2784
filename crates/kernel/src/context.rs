use fishbowl_camera::{CameraRig, EdgePan};
use fishbowl_common::{ControllerConfig, Viewport};
use fishbowl_input::{GestureTuning, InputProcessor};

/// Camera, input and viewport state owned by the active scene.
///
/// Built afresh for every scene, so nothing carries over a scene switch.
pub struct SceneContext {
    pub camera: CameraRig,
    pub input: InputProcessor,
    pub edge_pan: EdgePan,
    pub viewport: Viewport,
}

impl SceneContext {
    pub fn new(config: &ControllerConfig, viewport: Viewport, manipulable: bool) -> Self {
        Self {
            camera: CameraRig::from_config(config, viewport.aspect()),
            input: InputProcessor::new(GestureTuning::from(config), viewport.center(), manipulable),
            edge_pan: EdgePan::from_config(config),
            viewport,
        }
    }
}
