//! 节点国家/地区识别 (Country Classifier)
//!
//! 依次查询：旗帜 Emoji → 中文名 → 两位 ISO 代码 → 英文名，首个命中即返回。
//! 除 ISO 代码按分词精确匹配外，其余三张表均按子串包含匹配，
//! 同表内较长的键优先，等长时按声明顺序。

use std::collections::HashMap;
use std::sync::LazyLock;

/// 未命中任何表时的归属
pub const OTHER_REGION: &str = "Other Region";

struct Country {
    /// ISO 3166-1 代码，首个用于生成旗帜
    codes: &'static [&'static str],
    name: &'static str,
    zh: &'static [&'static str],
    en: &'static [&'static str],
}

const COUNTRIES: &[Country] = &[
    Country { codes: &["HK"], name: "Hong Kong", zh: &["香港"], en: &["Hong Kong", "HongKong"] },
    Country { codes: &["TW"], name: "Taiwan", zh: &["台湾", "台灣", "台北", "新北", "彰化"], en: &["Taiwan", "Taipei"] },
    Country { codes: &["MO"], name: "Macao", zh: &["澳门", "澳門"], en: &["Macao", "Macau"] },
    Country { codes: &["JP"], name: "Japan", zh: &["日本", "东京", "東京", "大阪", "埼玉"], en: &["Japan", "Tokyo", "Osaka"] },
    Country { codes: &["KR"], name: "South Korea", zh: &["韩国", "韓國", "首尔", "春川"], en: &["South Korea", "Korea", "Seoul"] },
    Country { codes: &["SG"], name: "Singapore", zh: &["新加坡", "狮城", "獅城"], en: &["Singapore"] },
    Country {
        codes: &["US"],
        name: "United States",
        zh: &["美国", "美國", "洛杉矶", "圣何塞", "硅谷", "西雅图", "纽约", "芝加哥", "达拉斯", "凤凰城"],
        en: &["United States", "America", "USA", "Los Angeles", "San Jose", "Silicon Valley", "Seattle", "New York", "Chicago", "Dallas"],
    },
    Country { codes: &["GB", "UK"], name: "United Kingdom", zh: &["英国", "英國", "伦敦"], en: &["United Kingdom", "Britain", "England", "London"] },
    Country { codes: &["DE"], name: "Germany", zh: &["德国", "德國", "法兰克福"], en: &["Germany", "Frankfurt"] },
    Country { codes: &["FR"], name: "France", zh: &["法国", "法國", "巴黎"], en: &["France", "Paris"] },
    Country { codes: &["NL"], name: "Netherlands", zh: &["荷兰", "荷蘭", "阿姆斯特丹"], en: &["Netherlands", "Amsterdam"] },
    Country { codes: &["RU"], name: "Russia", zh: &["俄罗斯", "俄羅斯", "莫斯科", "伯力"], en: &["Russia", "Moscow"] },
    Country { codes: &["CA"], name: "Canada", zh: &["加拿大", "多伦多", "温哥华", "蒙特利尔"], en: &["Canada", "Toronto", "Vancouver", "Montreal"] },
    Country { codes: &["AU"], name: "Australia", zh: &["澳大利亚", "澳洲", "悉尼", "墨尔本"], en: &["Australia", "Sydney", "Melbourne"] },
    Country { codes: &["NZ"], name: "New Zealand", zh: &["新西兰", "紐西蘭"], en: &["New Zealand"] },
    Country { codes: &["IN"], name: "India", zh: &["印度", "孟买"], en: &["India", "Mumbai"] },
    Country { codes: &["ID"], name: "Indonesia", zh: &["印度尼西亚", "印尼", "雅加达"], en: &["Indonesia", "Jakarta"] },
    Country { codes: &["MY"], name: "Malaysia", zh: &["马来西亚", "馬來西亞", "吉隆坡"], en: &["Malaysia", "Kuala Lumpur"] },
    Country { codes: &["TH"], name: "Thailand", zh: &["泰国", "泰國", "曼谷"], en: &["Thailand", "Bangkok"] },
    Country { codes: &["VN"], name: "Vietnam", zh: &["越南", "胡志明"], en: &["Vietnam", "Viet Nam"] },
    Country { codes: &["PH"], name: "Philippines", zh: &["菲律宾", "菲律賓", "马尼拉"], en: &["Philippines", "Manila"] },
    Country { codes: &["KH"], name: "Cambodia", zh: &["柬埔寨"], en: &["Cambodia"] },
    Country { codes: &["MN"], name: "Mongolia", zh: &["蒙古"], en: &["Mongolia"] },
    Country { codes: &["KZ"], name: "Kazakhstan", zh: &["哈萨克斯坦"], en: &["Kazakhstan"] },
    Country { codes: &["PK"], name: "Pakistan", zh: &["巴基斯坦"], en: &["Pakistan"] },
    Country { codes: &["BD"], name: "Bangladesh", zh: &["孟加拉"], en: &["Bangladesh"] },
    Country { codes: &["TR"], name: "Turkey", zh: &["土耳其", "伊斯坦布尔"], en: &["Turkey", "Türkiye", "Istanbul"] },
    Country { codes: &["AE"], name: "United Arab Emirates", zh: &["阿联酋", "迪拜"], en: &["United Arab Emirates", "Dubai", "UAE"] },
    Country { codes: &["SA"], name: "Saudi Arabia", zh: &["沙特"], en: &["Saudi Arabia"] },
    Country { codes: &["IL"], name: "Israel", zh: &["以色列"], en: &["Israel"] },
    Country { codes: &["IR"], name: "Iran", zh: &["伊朗"], en: &["Iran"] },
    Country { codes: &["EG"], name: "Egypt", zh: &["埃及"], en: &["Egypt"] },
    Country { codes: &["ZA"], name: "South Africa", zh: &["南非"], en: &["South Africa"] },
    Country { codes: &["NG"], name: "Nigeria", zh: &["尼日利亚"], en: &["Nigeria"] },
    Country { codes: &["IT"], name: "Italy", zh: &["意大利", "義大利", "米兰"], en: &["Italy", "Milan"] },
    Country { codes: &["ES"], name: "Spain", zh: &["西班牙", "马德里"], en: &["Spain", "Madrid"] },
    Country { codes: &["PT"], name: "Portugal", zh: &["葡萄牙"], en: &["Portugal"] },
    Country { codes: &["CH"], name: "Switzerland", zh: &["瑞士", "苏黎世"], en: &["Switzerland", "Zurich"] },
    Country { codes: &["SE"], name: "Sweden", zh: &["瑞典"], en: &["Sweden"] },
    Country { codes: &["NO"], name: "Norway", zh: &["挪威"], en: &["Norway"] },
    Country { codes: &["FI"], name: "Finland", zh: &["芬兰", "芬蘭"], en: &["Finland"] },
    Country { codes: &["DK"], name: "Denmark", zh: &["丹麦", "丹麥"], en: &["Denmark"] },
    Country { codes: &["IE"], name: "Ireland", zh: &["爱尔兰", "愛爾蘭"], en: &["Ireland", "Dublin"] },
    Country { codes: &["BE"], name: "Belgium", zh: &["比利时"], en: &["Belgium"] },
    Country { codes: &["LU"], name: "Luxembourg", zh: &["卢森堡"], en: &["Luxembourg"] },
    Country { codes: &["AT"], name: "Austria", zh: &["奥地利", "維也納"], en: &["Austria", "Vienna"] },
    Country { codes: &["PL"], name: "Poland", zh: &["波兰", "波蘭"], en: &["Poland", "Warsaw"] },
    Country { codes: &["CZ"], name: "Czechia", zh: &["捷克"], en: &["Czechia", "Czech"] },
    Country { codes: &["HU"], name: "Hungary", zh: &["匈牙利"], en: &["Hungary"] },
    Country { codes: &["RO"], name: "Romania", zh: &["罗马尼亚"], en: &["Romania"] },
    Country { codes: &["BG"], name: "Bulgaria", zh: &["保加利亚"], en: &["Bulgaria"] },
    Country { codes: &["GR"], name: "Greece", zh: &["希腊", "希臘"], en: &["Greece"] },
    Country { codes: &["UA"], name: "Ukraine", zh: &["乌克兰", "烏克蘭"], en: &["Ukraine", "Kyiv"] },
    Country { codes: &["BR"], name: "Brazil", zh: &["巴西", "圣保罗"], en: &["Brazil", "Sao Paulo"] },
    Country { codes: &["AR"], name: "Argentina", zh: &["阿根廷"], en: &["Argentina"] },
    Country { codes: &["CL"], name: "Chile", zh: &["智利"], en: &["Chile"] },
    Country { codes: &["MX"], name: "Mexico", zh: &["墨西哥"], en: &["Mexico"] },
    Country { codes: &["CN"], name: "China", zh: &["中国", "中國", "回国", "上海", "北京", "深圳", "广州"], en: &["China"] },
];

/// 两位字母代码转旗帜 Emoji (区域指示符号对)
fn flag_of(code: &str) -> String {
    code.bytes()
        .filter_map(|b| char::from_u32(0x1F1E6 + u32::from(b.to_ascii_uppercase().wrapping_sub(b'A'))))
        .collect()
}

/// 较长的键优先，`sort_by` 为稳定排序，等长键保持声明顺序
fn longest_first<K: AsRef<str>>(mut table: Vec<(K, &'static str)>) -> Vec<(K, &'static str)> {
    table.sort_by(|a, b| b.0.as_ref().len().cmp(&a.0.as_ref().len()));
    table
}

static FLAGS: LazyLock<Vec<(String, &'static str)>> = LazyLock::new(|| {
    longest_first(
        COUNTRIES
            .iter()
            .map(|c| (flag_of(c.codes[0]), c.name))
            .collect(),
    )
});

static CHINESE: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    longest_first(
        COUNTRIES
            .iter()
            .flat_map(|c| c.zh.iter().map(move |k| (*k, c.name)))
            .collect(),
    )
});

static ISO: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    COUNTRIES
        .iter()
        .flat_map(|c| c.codes.iter().map(move |k| (*k, c.name)))
        .collect()
});

static ENGLISH: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    longest_first(
        COUNTRIES
            .iter()
            .flat_map(|c| c.en.iter().map(move |k| (*k, c.name)))
            .collect(),
    )
});

fn find_contained<K: AsRef<str>>(table: &[(K, &'static str)], name: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| name.contains(key.as_ref()))
        .map(|(_, country)| *country)
}

/// 按分隔符 `-`、`_`、空格依次切分，收集两字节长的片段
fn iso_tokens(name: &str) -> impl Iterator<Item = String> + '_ {
    ['-', '_', ' ']
        .into_iter()
        .flat_map(move |sep| name.split(sep))
        .filter(|token| token.len() == 2)
        .map(str::to_ascii_uppercase)
}

/// 根据节点名称判定所属国家/地区
pub fn classify(name: &str) -> &'static str {
    find_contained(FLAGS.as_slice(), name)
        .or_else(|| find_contained(CHINESE.as_slice(), name))
        .or_else(|| iso_tokens(name).find_map(|token| ISO.get(token.as_str()).copied()))
        .or_else(|| find_contained(ENGLISH.as_slice(), name))
        .unwrap_or(OTHER_REGION)
}
