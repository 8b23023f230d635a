use serde::Deserialize;

use crate::geometry::{Point2D, PostureLandmarks};

/// BlazePose の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 可視度 (0.0〜1.0)
    #[serde(default = "default_visibility")]
    pub visibility: f32,
}

fn default_visibility() -> f32 {
    1.0
}

impl Keypoint {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    /// 可視度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// ピクセル座標に変換（切り捨て）
    pub fn to_pixel(&self, width: u32, height: u32) -> (i32, i32) {
        let px = (self.x * width as f32) as i32;
        let py = (self.y * height as f32) as i32;
        (px, py)
    }

    fn to_pixel_point(&self, width: u32, height: u32) -> Point2D {
        let (px, py) = self.to_pixel(width, height);
        Point2D::new(px as f32, py as f32)
    }
}

/// 1フレーム分のランドマーク列
#[derive(Debug, Clone, Default)]
pub struct Pose {
    pub keypoints: Vec<Keypoint>,
}

impl Pose {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }

    /// インデックスでランドマークを取得。モデルが返した数が足りなければNone
    pub fn get(&self, index: LandmarkIndex) -> Option<&Keypoint> {
        self.keypoints.get(index as usize)
    }

    /// 左肩・右肩・左耳をピクセル座標で取り出す
    ///
    /// どれかが欠けているか可視度が閾値未満なら、このフレームは未検出扱い。
    pub fn posture_landmarks(
        &self,
        width: u32,
        height: u32,
        min_visibility: f32,
    ) -> Option<PostureLandmarks> {
        let pick = |index: LandmarkIndex| {
            self.get(index)
                .filter(|kp| kp.is_valid(min_visibility))
                .map(|kp| kp.to_pixel_point(width, height))
        };

        Some(PostureLandmarks {
            left_shoulder: pick(LandmarkIndex::LeftShoulder)?,
            right_shoulder: pick(LandmarkIndex::RightShoulder)?,
            left_ear: pick(LandmarkIndex::LeftEar)?,
        })
    }
}
