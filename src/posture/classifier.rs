use serde::Serialize;
use std::fmt;

use crate::posture::Envelope;

/// 姿勢判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    GoodPosture,
    PoorPosture,
}

impl Verdict {
    pub fn is_poor(self) -> bool {
        self == Verdict::PoorPosture
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::GoodPosture => write!(f, "Good Posture"),
            Verdict::PoorPosture => write!(f, "Poor Posture"),
        }
    }
}

/// 肩・首のどちらかがエンベロープ外ならPoorPosture
pub fn classify(
    shoulder_angle: f32,
    neck_angle: f32,
    shoulder_envelope: &Envelope,
    neck_envelope: &Envelope,
) -> Verdict {
    if shoulder_envelope.contains(shoulder_angle) && neck_envelope.contains(neck_angle) {
        Verdict::GoodPosture
    } else {
        Verdict::PoorPosture
    }
}
