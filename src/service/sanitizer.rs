//! 输入规范化
//!
//! 部分地区使用逗号作为小数分隔符：`?amount=0,001` → `?amount=0.001`。
//! 只处理第一处 `amount` 参数，其余字符保持不变。

use std::{borrow::Cow, sync::LazyLock};

use regex::Regex;

static AMOUNT_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\?\&]amount=([0-9]+([\,\.][0-9]+)?)").unwrap());

/// 规范化金额中的小数逗号；无匹配时原样返回
pub fn sanitize(data: &str) -> Cow<'_, str> {
    match AMOUNT_PARAM.find(data) {
        Some(m) if m.as_str().contains(',') => {
            let fixed = m.as_str().replacen(',', ".", 1);
            let mut out = String::with_capacity(data.len());
            out.push_str(&data[..m.start()]);
            out.push_str(&fixed);
            out.push_str(&data[m.end()..]);
            Cow::Owned(out)
        }
        _ => Cow::Borrowed(data),
    }
}
