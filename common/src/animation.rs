//! アニメーション制御
//!
//! 見た目の変換だけを扱い、`StackState` には一切触れない。
//! 時刻は呼び出し側が `tick(now_ms)` で与える。

use crate::config::SwipeConfig;
use crate::decision::Action;
use crate::gesture::DragState;

/// フリックアウト終端の回転角 (deg)
const FLING_ROTATION_DEG: f64 = 30.0;

/// カードの見た目の変換
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub dx: f64,
    pub dy: f64,
    pub rotation_deg: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl Transform {
    pub const NEUTRAL: Transform = Transform {
        dx: 0.0,
        dy: 0.0,
        rotation_deg: 0.0,
        scale: 1.0,
        opacity: 1.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    fn lerp(&self, to: &Transform, t: f64) -> Transform {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Transform {
            dx: mix(self.dx, to.dx),
            dy: mix(self.dy, to.dy),
            rotation_deg: mix(self.rotation_deg, to.rotation_deg),
            scale: mix(self.scale, to.scale),
            opacity: mix(self.opacity, to.opacity).clamp(0.0, 1.0),
        }
    }

    /// CSS `transform` プロパティ値
    pub fn to_css(&self) -> String {
        format!(
            "translate({:.1}px, {:.1}px) rotate({:.2}deg) scale({:.3})",
            self.dx, self.dy, self.rotation_deg, self.scale
        )
    }
}

/// like/pass インジケータ
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Indicator {
    #[default]
    None,
    Like,
    Pass,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationKind {
    FlingOut(Action),
    Return,
    UndoEntrance,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Easing {
    EaseInCubic,
    EaseOutCubic,
    EaseOutBack,
}

impl Easing {
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
            }
        }
    }
}

/// 再生中のアニメーション
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    pub kind: AnimationKind,
    pub card_index: usize,
    from: Transform,
    to: Transform,
    easing: Easing,
    started_ms: f64,
    duration_ms: f64,
}

impl Animation {
    pub fn progress(&self, now_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        ((now_ms - self.started_ms) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn sample(&self, now_ms: f64) -> Transform {
        let t = self.easing.apply(self.progress(now_ms));
        self.from.lerp(&self.to, t)
    }

    pub fn is_finished(&self, now_ms: f64) -> bool {
        self.progress(now_ms) >= 1.0
    }
}

/// アニメーション終了通知
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationFinished {
    pub kind: AnimationKind,
    pub card_index: usize,
    /// 本来の終了時刻（開始 + 所要時間）。フレーム間隔に左右されない
    pub ended_ms: f64,
}

/// トップカードの見た目を管理する
#[derive(Clone, Debug)]
pub struct AnimationController {
    config: SwipeConfig,
    clock_ms: f64,
    drag: Option<(usize, Transform)>,
    active: Option<Animation>,
}

impl AnimationController {
    pub fn new(config: SwipeConfig) -> Self {
        Self {
            config,
            clock_ms: 0.0,
            drag: None,
            active: None,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn active(&self) -> Option<&Animation> {
        self.active.as_ref()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// ドラッグ追従（平滑化なしの 1:1）
    pub fn follow_drag(&mut self, card_index: usize, drag: &DragState) -> Transform {
        self.advance_clock(drag.current().t_ms);
        let transform = Transform {
            dx: drag.delta_x(),
            dy: drag.delta_y(),
            rotation_deg: drag.rotation(self.config.rotation_factor),
            ..Transform::NEUTRAL
        };
        self.drag = Some((card_index, transform));
        transform
    }

    pub fn clear_drag(&mut self) -> Option<Transform> {
        self.drag.take().map(|(_, t)| t)
    }

    /// 確定方向へのフリックアウト
    pub fn start_fling(&mut self, card_index: usize, action: Action, now_ms: f64) {
        let from = self.take_start_pose(card_index);
        let to = self.fling_pose(action, from.dy);
        self.start(AnimationKind::FlingOut(action), card_index, from, to, Easing::EaseInCubic, self.config.fling_out_ms, now_ms);
    }

    /// 中立位置への戻り
    pub fn start_return(&mut self, card_index: usize, now_ms: f64) {
        let from = self.take_start_pose(card_index);
        self.start(AnimationKind::Return, card_index, from, Transform::NEUTRAL, Easing::EaseOutBack, self.config.return_ms, now_ms);
    }

    /// 戻す操作で、確定時に出ていった方向からカードを再入場させる
    pub fn start_undo(&mut self, card_index: usize, action: Action, now_ms: f64) {
        self.drag = None;
        let from = self.fling_pose(action, 0.0);
        self.start(AnimationKind::UndoEntrance, card_index, from, Transform::NEUTRAL, Easing::EaseOutCubic, self.config.undo_ms, now_ms);
    }

    /// 時刻を進め、終了したアニメーションがあれば通知する
    pub fn tick(&mut self, now_ms: f64) -> Option<AnimationFinished> {
        self.advance_clock(now_ms);
        let animation = self.active?;
        if !animation.is_finished(self.clock_ms) {
            return None;
        }
        self.active = None;
        Some(AnimationFinished {
            kind: animation.kind,
            card_index: animation.card_index,
            ended_ms: animation.started_ms + animation.duration_ms.max(0.0),
        })
    }

    /// カードの現在の変換（ドラッグ中・再生中のカードのみ）
    pub fn transform_for(&self, card_index: usize) -> Option<Transform> {
        if let Some(animation) = self.active.filter(|a| a.card_index == card_index) {
            return Some(animation.sample(self.clock_ms));
        }
        self.drag
            .filter(|(index, _)| *index == card_index)
            .map(|(_, t)| t)
    }

    /// 変換に対応するインジケータ
    pub fn indicator(&self, transform: &Transform) -> Indicator {
        let threshold = self.config.indicator_threshold;
        if transform.dx > threshold {
            Indicator::Like
        } else if transform.dx < -threshold {
            Indicator::Pass
        } else {
            Indicator::None
        }
    }

    /// 奥のカードの固定カスケード（depth 0 がトップ）
    pub fn peek_transform(&self, depth: usize) -> Transform {
        let depth = depth as f64;
        Transform {
            dy: depth * self.config.peek_offset_step,
            scale: (1.0 - depth * self.config.peek_scale_step).max(0.0),
            ..Transform::NEUTRAL
        }
    }

    fn fling_pose(&self, action: Action, dy: f64) -> Transform {
        let direction = action.direction();
        Transform {
            dx: direction * self.config.fling_distance,
            dy,
            rotation_deg: direction * FLING_ROTATION_DEG,
            scale: 1.0,
            opacity: 0.0,
        }
    }

    fn take_start_pose(&mut self, card_index: usize) -> Transform {
        match self.drag.take() {
            Some((index, transform)) if index == card_index => transform,
            _ => Transform::NEUTRAL,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn start(
        &mut self,
        kind: AnimationKind,
        card_index: usize,
        from: Transform,
        to: Transform,
        easing: Easing,
        duration_ms: f64,
        now_ms: f64,
    ) {
        // 過去の時刻（待機要求の適用）から始めることもある
        self.advance_clock(now_ms);
        self.active = Some(Animation {
            kind,
            card_index,
            from,
            to,
            easing,
            started_ms: now_ms,
            duration_ms,
        });
    }

    fn advance_clock(&mut self, now_ms: f64) {
        if now_ms > self.clock_ms {
            self.clock_ms = now_ms;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{GestureTracker, Point, PointerId, PointerKind};

    fn controller() -> AnimationController {
        AnimationController::new(SwipeConfig::default())
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::EaseInCubic, Easing::EaseOutCubic, Easing::EaseOutBack] {
            assert!(easing.apply(0.0).abs() < 1e-9);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-9);
        }
        assert!(Easing::EaseOutBack.apply(0.7) > 1.0);
    }

    #[test]
    fn test_drag_follows_pointer_one_to_one() {
        let mut tracker = GestureTracker::new();
        let mut anim = controller();
        tracker.begin(PointerId(1), PointerKind::Mouse, Point::new(10.0, 10.0, 0.0));
        let drag = *tracker.update(PointerId(1), Point::new(70.0, 30.0, 16.0)).expect("追跡中");

        let transform = anim.follow_drag(0, &drag);
        assert_eq!(transform.dx, 60.0);
        assert_eq!(transform.dy, 20.0);
        assert!((transform.rotation_deg - 6.0).abs() < 1e-9);
        assert_eq!(anim.transform_for(0), Some(transform));
        assert_eq!(anim.transform_for(1), None);
        assert_eq!(anim.indicator(&transform), Indicator::Like);
    }

    #[test]
    fn test_fling_runs_fixed_duration() {
        let mut anim = controller();
        anim.start_fling(2, Action::Pass, 1000.0);
        assert!(anim.is_animating());

        assert_eq!(anim.tick(1150.0), None);
        let mid = anim.transform_for(2).expect("再生中");
        assert!(mid.dx < 0.0);

        let finished = anim.tick(1300.0).expect("終了通知");
        assert_eq!(finished.kind, AnimationKind::FlingOut(Action::Pass));
        assert_eq!(finished.card_index, 2);
        assert_eq!(finished.ended_ms, 1300.0);
        assert!(!anim.is_animating());
        assert_eq!(anim.tick(1400.0), None);
    }

    #[test]
    fn test_return_ends_neutral() {
        let mut anim = controller();
        anim.start_return(0, 0.0);
        anim.tick(100.0);
        let finished = anim.tick(250.0).expect("終了通知");
        assert_eq!(finished.kind, AnimationKind::Return);
        assert_eq!(anim.transform_for(0), None);
    }

    #[test]
    fn test_undo_enters_from_commit_side() {
        let mut anim = controller();
        anim.start_undo(1, Action::Like, 0.0);
        let start = anim.transform_for(1).expect("再生中");
        assert!(start.dx > 0.0);
        assert_eq!(start.opacity, 0.0);
    }

    #[test]
    fn test_peek_cascade() {
        let anim = controller();
        assert!(anim.peek_transform(0).is_neutral());
        let second = anim.peek_transform(1);
        assert_eq!(second.dy, 10.0);
        assert!((second.scale - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_finishes_on_next_tick() {
        let mut anim = AnimationController::new(SwipeConfig {
            fling_out_ms: 0.0,
            ..Default::default()
        });
        anim.start_fling(0, Action::Like, 50.0);
        assert!(anim.tick(50.0).is_some());
    }
}
