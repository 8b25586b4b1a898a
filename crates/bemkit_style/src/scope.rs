use std::sync::atomic::{AtomicU64, Ordering};

static SCOPE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Allocates the next scope class, `bem-` followed by the base-36 value of
/// a process-wide counter. The counter only ever increases, so two calls
/// never return the same class, from any thread.
pub fn next_scope_class() -> String {
  let id = SCOPE_COUNTER.fetch_add(1, Ordering::Relaxed);
  format!("bem-{}", to_base36(id))
}

fn to_base36(mut num: u64) -> String {
  if num == 0 {
    return "0".to_string();
  }

  let chars = b"0123456789abcdefghijklmnopqrstuvwxyz";
  let mut result = Vec::new();

  while num > 0 {
    result.push(chars[(num % 36) as usize] as char);
    num /= 36;
  }

  result.reverse();
  result.into_iter().collect()
}
