//! ジェスチャ追跡
//!
//! トップカード上のポインタ1本だけを追跡し、ドラッグ量と水平速度を求める。
//! 2本目のポインタ（マルチタッチのノイズ）は無視する。全操作 O(1)・同期。

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub i32);

/// 画面座標 (px) と時刻 (ms)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, alias = "tMs")]
    pub t_ms: f64,
}

impl Point {
    pub fn new(x: f64, y: f64, t_ms: f64) -> Self {
        Self { x, y, t_ms }
    }
}

/// 進行中のドラッグ
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pointer: PointerId,
    kind: PointerKind,
    start: Point,
    previous: Point,
    current: Point,
}

impl DragState {
    fn new(pointer: PointerId, kind: PointerKind, start: Point) -> Self {
        Self {
            pointer,
            kind,
            start,
            previous: start,
            current: start,
        }
    }

    fn push(&mut self, point: Point) {
        // 同時刻のサンプルは位置だけ更新し、速度計算用の前回サンプルを残す
        if point.t_ms > self.current.t_ms {
            self.previous = self.current;
        }
        self.current = point;
    }

    pub fn pointer(&self) -> PointerId {
        self.pointer
    }

    pub fn kind(&self) -> PointerKind {
        self.kind
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn current(&self) -> Point {
        self.current
    }

    pub fn delta_x(&self) -> f64 {
        self.current.x - self.start.x
    }

    pub fn delta_y(&self) -> f64 {
        self.current.y - self.start.y
    }

    /// 水平移動量に比例した回転角 (deg)
    pub fn rotation(&self, factor: f64) -> f64 {
        self.delta_x() * factor
    }

    /// 直近2サンプルから求めた水平速度 (px/ms)
    pub fn velocity_x(&self) -> f64 {
        let dt = self.current.t_ms - self.previous.t_ms;
        if dt > 0.0 {
            (self.current.x - self.previous.x) / dt
        } else {
            0.0
        }
    }
}

/// ジェスチャ終了時の確定値
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureRelease {
    pub delta_x: f64,
    pub delta_y: f64,
    pub velocity_x: f64,
    /// キャンセル（ポインタが追跡面を離れた等）
    pub cancelled: bool,
}

/// 単一ポインタのジェスチャトラッカー
#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    drag: Option<DragState>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// ジェスチャ開始。既に追跡中なら false（2本目は無視）
    pub fn begin(&mut self, pointer: PointerId, kind: PointerKind, point: Point) -> bool {
        if self.drag.is_some() {
            return false;
        }
        self.drag = Some(DragState::new(pointer, kind, point));
        true
    }

    /// 位置更新。追跡中のポインタ以外は無視
    pub fn update(&mut self, pointer: PointerId, point: Point) -> Option<&DragState> {
        match self.drag.as_mut() {
            Some(drag) if drag.pointer == pointer => {
                drag.push(point);
                Some(&*drag)
            }
            _ => None,
        }
    }

    /// ジェスチャ終了
    pub fn end(&mut self, pointer: PointerId, point: Point) -> Option<GestureRelease> {
        let mut drag = self.take_if(pointer)?;
        drag.push(point);
        Some(GestureRelease {
            delta_x: drag.delta_x(),
            delta_y: drag.delta_y(),
            velocity_x: drag.velocity_x(),
            cancelled: false,
        })
    }

    /// ジェスチャ取り消し（しきい値判定は常に不成立）
    pub fn cancel(&mut self, pointer: PointerId) -> Option<GestureRelease> {
        let drag = self.take_if(pointer)?;
        Some(GestureRelease {
            delta_x: drag.delta_x(),
            delta_y: drag.delta_y(),
            velocity_x: 0.0,
            cancelled: true,
        })
    }

    /// 追跡状態を破棄（カードが入れ替わった時など）
    pub fn reset(&mut self) {
        self.drag = None;
    }

    fn take_if(&mut self, pointer: PointerId) -> Option<DragState> {
        if self.drag.map(|d| d.pointer) == Some(pointer) {
            self.drag.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUSE: PointerId = PointerId(1);

    #[test]
    fn test_begin_update_end() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.begin(MOUSE, PointerKind::Mouse, Point::new(100.0, 200.0, 0.0)));
        assert!(tracker.is_active());

        let drag = tracker.update(MOUSE, Point::new(160.0, 210.0, 100.0)).expect("追跡中");
        assert_eq!(drag.delta_x(), 60.0);
        assert_eq!(drag.delta_y(), 10.0);
        assert!((drag.rotation(0.1) - 6.0).abs() < 1e-9);

        let release = tracker.end(MOUSE, Point::new(180.0, 210.0, 200.0)).expect("終了");
        assert_eq!(release.delta_x, 80.0);
        assert!((release.velocity_x - 0.2).abs() < 1e-9);
        assert!(!release.cancelled);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_second_pointer_ignored() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.begin(MOUSE, PointerKind::Touch, Point::new(0.0, 0.0, 0.0)));
        assert!(!tracker.begin(PointerId(2), PointerKind::Touch, Point::new(50.0, 0.0, 10.0)));
        assert!(tracker.update(PointerId(2), Point::new(300.0, 0.0, 20.0)).is_none());
        assert!(tracker.end(PointerId(2), Point::new(300.0, 0.0, 30.0)).is_none());

        let drag = tracker.drag().expect("追跡中");
        assert_eq!(drag.pointer(), MOUSE);
        assert_eq!(drag.delta_x(), 0.0);
    }

    #[test]
    fn test_inactive_operations_are_noops() {
        let mut tracker = GestureTracker::new();
        assert!(tracker.update(MOUSE, Point::new(1.0, 1.0, 1.0)).is_none());
        assert!(tracker.end(MOUSE, Point::new(1.0, 1.0, 1.0)).is_none());
        assert!(tracker.cancel(MOUSE).is_none());
    }

    #[test]
    fn test_cancel_marks_release() {
        let mut tracker = GestureTracker::new();
        tracker.begin(MOUSE, PointerKind::Mouse, Point::new(0.0, 0.0, 0.0));
        tracker.update(MOUSE, Point::new(250.0, 0.0, 10.0));
        let release = tracker.cancel(MOUSE).expect("取り消し");
        assert!(release.cancelled);
        assert_eq!(release.delta_x, 250.0);
        assert!(!tracker.is_active());
    }

    #[test]
    fn test_same_timestamp_keeps_velocity_sample() {
        let mut tracker = GestureTracker::new();
        tracker.begin(MOUSE, PointerKind::Mouse, Point::new(0.0, 0.0, 0.0));
        tracker.update(MOUSE, Point::new(40.0, 0.0, 20.0));
        let release = tracker.end(MOUSE, Point::new(60.0, 0.0, 20.0)).expect("終了");
        assert!((release.velocity_x - 3.0).abs() < 1e-9);
    }
}
