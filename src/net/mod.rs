//! # 生产过程 Petri 网模型（Place/Transition Net）
//!
//! 网络由三组有序集合描述：库所 `P`、迁移 `T` 与带权弧 `A`。弧只以 id 引用端点，
//! 方向取 `place-to-transition` 或 `transition-to-place`。对任意标识 `M`：
//!
//! * 迁移 `t` **可激发** 当且仅当对每条输入弧 `(p, t, w)` 满足 `M[p] ≥ w`；
//!   没有输入弧的迁移恒可激发；
//! * 迁移 **发射** 后先减去全部输入弧权重，再加上输出弧权重，
//!   若库所声明了容量则截断到容量（多余托肯被丢弃，不视为错误）。
//!
//! 本模块只包含被动数据、查找与校验；发射语义见 [`crate::engine`]。
//!
//! ## 示例
//!
//! ```rust
//! use prodnet::net::*;
//!
//! let mut net = Net::empty();
//! net.add_place(Place::new_with_capacity("p1", "P1", 1, 1));
//! net.add_place(Place::new_with_capacity("p2", "P2", 0, 5));
//! net.add_transition(Transition::new("t1", "T1"));
//! net.add_input_arc("p1", "t1", 1);
//! net.add_output_arc("t1", "p2", 1);
//!
//! assert!(net.validate().is_ok());
//! assert_eq!(net.marking().tokens("p1"), Some(1));
//! ```

pub mod core;
pub mod ids;
pub mod io;
pub mod structure;

pub use core::{Net, NetError, NetNode};
pub use ids::{ArcId, PlaceId, TransitionId};
pub use structure::{Arc, ArcDirection, Marking, Place, Position, Transition, Weight};
