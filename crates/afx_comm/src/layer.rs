// crates/afx_comm/src/layer.rs

//! 消息层基底
//!
//! 核心假定的消息契约：阻塞式点对点收发（按 (源, tag) 先进先出
//! 匹配）、配对 sendrecv、根广播、按 rank 的 scatter 与全体同步
//! 栅栏。类型化记录都以不透明字节缓冲搬运，编码职责在 codec。

use std::sync::Arc;

use afx_foundation::{AfxError, AfxResult};
use parking_lot::{Condvar, Mutex};

/// 广播使用的保留 tag
const TAG_BCAST: u32 = u32::MAX;
/// scatter 使用的保留 tag
const TAG_SCATTER: u32 = u32::MAX - 1;

/// 消息传递基底
pub trait MessageLayer: Send + Sync {
    /// 本 worker 的 rank
    fn rank(&self) -> usize;

    /// worker 总数
    fn size(&self) -> usize;

    /// 阻塞发送（缓冲语义：入队即返回，接收方负责排空）
    fn send(&self, dest: usize, tag: u32, data: Vec<u8>) -> AfxResult<()>;

    /// 阻塞接收，按 (源, tag) 先进先出匹配
    fn recv(&self, src: usize, tag: u32) -> AfxResult<Vec<u8>>;

    /// 配对收发：双方各自发送后接收，同一 tag
    fn send_recv(&self, peer: usize, tag: u32, data: Vec<u8>) -> AfxResult<Vec<u8>> {
        self.send(peer, tag, data)?;
        self.recv(peer, tag)
    }

    /// 根广播：root 传 `Some(data)`，其余传 `None`；返回广播内容
    fn broadcast(&self, root: usize, data: Option<Vec<u8>>) -> AfxResult<Vec<u8>>;

    /// 按 rank scatter 一个 usize（块数分配用）
    fn scatter_usize(&self, root: usize, values: Option<&[usize]>) -> AfxResult<usize>;

    /// 全体同步栅栏
    fn barrier(&self) -> AfxResult<()>;
}

// ============================================================
// 单 worker 基底
// ============================================================

/// 单 worker 基底：自发自收
#[derive(Default)]
pub struct SoloComm {
    queue: Mutex<Vec<(u32, Vec<u8>)>>,
}

impl SoloComm {
    /// 创建单 worker 基底
    pub fn new() -> Self {
        Self::default()
    }
}

impl MessageLayer for SoloComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&self, dest: usize, tag: u32, data: Vec<u8>) -> AfxResult<()> {
        if dest != 0 {
            return Err(AfxError::halo(format!("单 worker 基底无法送往 rank {}", dest)));
        }
        self.queue.lock().push((tag, data));
        Ok(())
    }

    fn recv(&self, src: usize, tag: u32) -> AfxResult<Vec<u8>> {
        if src != 0 {
            return Err(AfxError::halo(format!("单 worker 基底无法收自 rank {}", src)));
        }
        let mut q = self.queue.lock();
        if let Some(pos) = q.iter().position(|(t, _)| *t == tag) {
            Ok(q.remove(pos).1)
        } else {
            Err(AfxError::halo(format!("tag {} 无待收消息", tag)))
        }
    }

    fn broadcast(&self, _root: usize, data: Option<Vec<u8>>) -> AfxResult<Vec<u8>> {
        data.ok_or_else(|| AfxError::halo("单 worker 广播缺少数据".to_string()))
    }

    fn scatter_usize(&self, _root: usize, values: Option<&[usize]>) -> AfxResult<usize> {
        let v = values.ok_or_else(|| AfxError::halo("单 worker scatter 缺少数据".to_string()))?;
        v.first()
            .copied()
            .ok_or_else(|| AfxError::halo("scatter 数据为空".to_string()))
    }

    fn barrier(&self) -> AfxResult<()> {
        Ok(())
    }
}

// ============================================================
// 多线程基底
// ============================================================

struct Message {
    src: usize,
    tag: u32,
    data: Vec<u8>,
}

struct Mailbox {
    inbox: Mutex<Vec<Message>>,
    signal: Condvar,
}

struct Shared {
    mailboxes: Vec<Mailbox>,
    barrier: std::sync::Barrier,
}

/// 同进程多 rank 基底
///
/// [`ThreadComm::create`] 返回 N 个句柄，每个线程持有一个；语义
/// 对齐消息层契约（FIFO 匹配、缓冲发送、阻塞接收）。
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// 创建 N 个 rank 的基底句柄
    pub fn create(n: usize) -> Vec<ThreadComm> {
        let shared = Arc::new(Shared {
            mailboxes: (0..n)
                .map(|_| Mailbox {
                    inbox: Mutex::new(Vec::new()),
                    signal: Condvar::new(),
                })
                .collect(),
            barrier: std::sync::Barrier::new(n),
        });
        (0..n)
            .map(|rank| ThreadComm {
                rank,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl MessageLayer for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.mailboxes.len()
    }

    fn send(&self, dest: usize, tag: u32, data: Vec<u8>) -> AfxResult<()> {
        let mb = self
            .shared
            .mailboxes
            .get(dest)
            .ok_or_else(|| AfxError::halo(format!("目标 rank {} 不存在", dest)))?;
        mb.inbox.lock().push(Message {
            src: self.rank,
            tag,
            data,
        });
        mb.signal.notify_all();
        Ok(())
    }

    fn recv(&self, src: usize, tag: u32) -> AfxResult<Vec<u8>> {
        let mb = &self.shared.mailboxes[self.rank];
        let mut inbox = mb.inbox.lock();
        loop {
            if let Some(pos) = inbox.iter().position(|m| m.src == src && m.tag == tag) {
                return Ok(inbox.remove(pos).data);
            }
            mb.signal.wait(&mut inbox);
        }
    }

    fn broadcast(&self, root: usize, data: Option<Vec<u8>>) -> AfxResult<Vec<u8>> {
        if self.rank == root {
            let data =
                data.ok_or_else(|| AfxError::halo("广播 root 缺少数据".to_string()))?;
            for dest in 0..self.size() {
                if dest != root {
                    self.send(dest, TAG_BCAST, data.clone())?;
                }
            }
            Ok(data)
        } else {
            self.recv(root, TAG_BCAST)
        }
    }

    fn scatter_usize(&self, root: usize, values: Option<&[usize]>) -> AfxResult<usize> {
        if self.rank == root {
            let values = values
                .ok_or_else(|| AfxError::halo("scatter root 缺少数据".to_string()))?;
            if values.len() != self.size() {
                return Err(AfxError::halo(format!(
                    "scatter 数据长度 {} 与 worker 数 {} 不符",
                    values.len(),
                    self.size()
                )));
            }
            for (dest, v) in values.iter().enumerate() {
                if dest != root {
                    self.send(dest, TAG_SCATTER, v.to_le_bytes().to_vec())?;
                }
            }
            Ok(values[root])
        } else {
            let bytes = self.recv(root, TAG_SCATTER)?;
            let arr: [u8; 8] = bytes
                .try_into()
                .map_err(|_| AfxError::halo("scatter 载荷长度异常".to_string()))?;
            Ok(usize::from_le_bytes(arr))
        }
    }

    fn barrier(&self) -> AfxResult<()> {
        self.shared.barrier.wait();
        Ok(())
    }
}
